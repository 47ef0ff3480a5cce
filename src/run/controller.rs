use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use futures::StreamExt;

use super::round::RunRound;
use super::types::{AwaitingInput, RunOutcome, RunOutput, RunState};
use super::RunOptions;
use crate::config::OrbitConfig;
use crate::error::{OrbitError, Result};
use crate::schema::strictify;
use crate::tools::{ToolDescriptor, ToolRegistry};
use crate::tracker::{ToolCallTracker, TrackerLimits};
use crate::transport::RunTransport;
use crate::types::{OutgoingMessage, PendingToolCall, RunEvent, ToolResult};

/// Drives a run through as many tool rounds as the model asks for.
pub struct RunController {
    transport: Arc<dyn RunTransport>,
    registry: Option<Arc<ToolRegistry>>,
    config: OrbitConfig,
}

/// What one round's stream left behind.
struct RoundSummary {
    text: String,
    run_id: Option<String>,
    local_calls: Vec<PendingToolCall>,
    client_calls: Vec<PendingToolCall>,
}

struct RoundTrackers {
    all: ToolCallTracker,
    client: ToolCallTracker,
    started_order: Vec<String>,
}

impl RunController {
    pub fn new(transport: Arc<dyn RunTransport>) -> Self {
        Self {
            transport,
            registry: None,
            config: OrbitConfig::default(),
        }
    }

    pub fn with_registry(mut self, registry: Arc<ToolRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_config(mut self, config: OrbitConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &OrbitConfig {
        &self.config
    }

    /// Run from the caller's input until the model stops calling tools or a
    /// client tool needs an answer.
    pub async fn run(&self, input: impl Into<String>, options: RunOptions) -> Result<RunOutcome> {
        let message = OutgoingMessage::user(input);
        self.drive_logged(0, message, None, &options).await
    }

    /// Continue a run paused on client tools.
    ///
    /// `results` must answer every call in `awaiting.pending_calls`; they are
    /// sent together with the locally executed results of the same round.
    pub async fn resume(
        &self,
        awaiting: AwaitingInput,
        results: Vec<ToolResult>,
        options: RunOptions,
    ) -> Result<RunOutcome> {
        for call in &awaiting.pending_calls {
            if !results.iter().any(|result| result.call_id == call.call_id) {
                return Err(OrbitError::InvalidArgument(format!(
                    "missing result for client tool call {} ({})",
                    call.call_id, call.tool_name
                )));
            }
        }
        for result in &results {
            if !awaiting
                .pending_calls
                .iter()
                .any(|call| call.call_id == result.call_id)
            {
                tracing::warn!(call_id = %result.call_id, "result for a call that was not pending");
            }
        }

        let mut combined = awaiting.local_results;
        combined.extend(results);
        let message = OutgoingMessage::tool_results(combined);
        self.drive_logged(awaiting.round, message, awaiting.previous_run_id, &options)
            .await
    }

    async fn drive_logged(
        &self,
        round: usize,
        message: OutgoingMessage,
        previous_run_id: Option<String>,
        options: &RunOptions,
    ) -> Result<RunOutcome> {
        tracing::debug!(state = %RunState::Idle, round, "run starting");
        let result = self.drive(round, message, previous_run_id, options).await;
        if let Err(err) = &result {
            tracing::debug!(state = %RunState::Failed, error = %err, "run failed");
        }
        result
    }

    async fn drive(
        &self,
        mut round_number: usize,
        mut message: OutgoingMessage,
        mut previous_run_id: Option<String>,
        options: &RunOptions,
    ) -> Result<RunOutcome> {
        let max_rounds = options.max_tool_rounds.unwrap_or(self.config.max_tool_rounds);
        let tools = self.offered_tools(&options.client_tools);
        let schemas = self.input_schemas(&options.client_tools);

        loop {
            if options.cancel.is_cancelled() {
                return Err(OrbitError::Canceled);
            }

            let round = RunRound::new(round_number, previous_run_id.take(), message, tools.clone());
            let summary = self.stream_round(&round, &schemas, options).await?;

            if summary.local_calls.is_empty() && summary.client_calls.is_empty() {
                tracing::debug!(state = %RunState::Done, round = round_number, "run complete");
                return Ok(RunOutcome::Completed(RunOutput {
                    text: summary.text,
                    rounds: round_number + 1,
                    run_id: summary.run_id,
                    finished_at: Utc::now(),
                }));
            }

            let local_results = self.execute_calls(&summary.local_calls).await?;

            round_number += 1;
            if let Some(checkpoint) = &options.checkpoint {
                if !checkpoint(round_number).await {
                    return Err(OrbitError::AbortedByCheckpoint {
                        round: round_number,
                    });
                }
            }
            if round_number > max_rounds {
                return Err(OrbitError::MaxToolRoundsExceeded { limit: max_rounds });
            }

            if !summary.client_calls.is_empty() {
                tracing::debug!(
                    round = round_number,
                    pending = summary.client_calls.len(),
                    "run awaiting client tool results"
                );
                return Ok(RunOutcome::AwaitingInput(AwaitingInput {
                    previous_run_id: summary.run_id,
                    round: round_number,
                    pending_calls: summary.client_calls,
                    local_results,
                }));
            }

            tracing::debug!(
                state = %RunState::Continuing,
                round = round_number,
                results = local_results.len(),
                "continuing with tool results"
            );
            message = OutgoingMessage::tool_results(local_results);
            previous_run_id = summary.run_id;
        }
    }

    async fn stream_round(
        &self,
        round: &RunRound,
        schemas: &HashMap<String, serde_json::Value>,
        options: &RunOptions,
    ) -> Result<RoundSummary> {
        let limits = TrackerLimits::from_config(&self.config);
        let mut trackers = RoundTrackers {
            all: ToolCallTracker::new(limits.clone()).with_schemas(schemas.clone()),
            client: ToolCallTracker::with_allow_list(
                options.client_tools.iter().map(|tool| tool.name.clone()),
                limits,
            ),
            started_order: Vec::new(),
        };

        tracing::debug!(state = %RunState::Requesting, round = round.round_number, "opening round");
        let mut stream = self
            .transport
            .open_run(&round.to_request(), options.cancel.clone())
            .await?;
        tracing::debug!(state = %RunState::Streaming, round = round.round_number, "streaming");

        let mut text = String::new();
        let mut run_id = None;
        loop {
            let next = tokio::select! {
                biased;
                _ = options.cancel.cancelled() => return Err(OrbitError::Canceled),
                next = stream.next() => next,
            };
            let event = match next {
                Some(Ok(event)) => event,
                Some(Err(err)) => return Err(err),
                None => break,
            };

            if let Some(observer) = &options.observer {
                observer(&event);
            }

            let notifications = trackers.all.process_event(&event)?;
            trackers.client.process_event(&event)?;
            if let Some(sink) = &options.notification_sink {
                for notification in notifications {
                    sink(notification);
                }
            }

            match event {
                RunEvent::RunStarted { run_id: id, .. } => run_id = Some(id),
                RunEvent::TextDelta { text: delta } => text.push_str(&delta),
                RunEvent::ToolCallStarted { call_id, .. } => trackers.started_order.push(call_id),
                RunEvent::RunError { message, code } => {
                    return Err(OrbitError::RunFailed { message, code });
                }
                RunEvent::RunFinished => break,
                RunEvent::ToolCallArgs { .. }
                | RunEvent::ToolCallChunk { .. }
                | RunEvent::ToolCallEnded { .. }
                | RunEvent::ToolCallResult { .. } => {}
            }
        }

        if run_id.is_none() {
            tracing::warn!(round = round.round_number, "round stream carried no run id");
        }

        let mut pending = trackers.all.pending_calls();
        pending.sort_by_key(|call| {
            trackers
                .started_order
                .iter()
                .position(|id| id == &call.call_id)
                .unwrap_or(usize::MAX)
        });
        let (client_calls, local_calls): (Vec<_>, Vec<_>) = pending
            .into_iter()
            .partition(|call| trackers.client.is_tracked(&call.call_id));

        tracing::debug!(
            round = round.round_number,
            text_bytes = text.len(),
            "round stream finished"
        );
        Ok(RoundSummary {
            text,
            run_id,
            local_calls,
            client_calls,
        })
    }

    async fn execute_calls(&self, calls: &[PendingToolCall]) -> Result<Vec<ToolResult>> {
        if calls.is_empty() {
            return Ok(Vec::new());
        }
        let registry = self
            .registry
            .as_ref()
            .ok_or(OrbitError::MissingToolRegistry)?;

        let futures = calls.iter().map(|call| {
            let arguments = call.effective_arguments();
            async move {
                if !call.is_finalized() {
                    tracing::warn!(
                        call_id = %call.call_id,
                        tool = %call.tool_name,
                        "no end event for tool call; executing with buffered arguments"
                    );
                }
                tracing::debug!(call_id = %call.call_id, tool = %call.tool_name, "executing tool");
                registry
                    .execute(&call.tool_name, &call.call_id, &arguments)
                    .await
            }
        });
        Ok(join_all(futures).await)
    }

    fn offered_tools(&self, client_tools: &[ToolDescriptor]) -> Vec<ToolDescriptor> {
        let mut tools = match &self.registry {
            Some(registry) if self.config.strict_tool_schemas => registry.to_strict_protocol_format(),
            Some(registry) => registry.to_protocol_format(),
            None => Vec::new(),
        };
        tools.extend(client_tools.iter().cloned().map(|mut tool| {
            if self.config.strict_tool_schemas {
                tool.input_schema = strictify(&tool.input_schema);
            }
            tool
        }));
        tools
    }

    fn input_schemas(&self, client_tools: &[ToolDescriptor]) -> HashMap<String, serde_json::Value> {
        let mut schemas = self
            .registry
            .as_ref()
            .map(|registry| registry.input_schemas())
            .unwrap_or_default();
        for tool in client_tools {
            schemas.insert(tool.name.clone(), tool.input_schema.clone());
        }
        schemas
    }
}

impl std::fmt::Debug for RunController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunController")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
