//! Outcome types of a run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::types::{PendingToolCall, ToolResult};

/// Controller lifecycle state, logged on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RunState {
    Idle,
    Requesting,
    Streaming,
    Continuing,
    Done,
    Failed,
}

/// Final output of a run that finished without pending calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutput {
    /// Text streamed in the terminal round.
    pub text: String,
    /// Number of rounds opened, counting the terminal one.
    pub rounds: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    pub finished_at: DateTime<Utc>,
}

/// A run paused on client tools whose results must come from the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AwaitingInput {
    /// Run id of the round that requested the calls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_run_id: Option<String>,
    /// Round number the resumed run continues from.
    pub round: usize,
    /// Client calls with their finalized arguments.
    pub pending_calls: Vec<PendingToolCall>,
    /// Results of calls executed locally in the same round.
    pub local_results: Vec<ToolResult>,
}

impl AwaitingInput {
    pub fn pending_call_ids(&self) -> Vec<&str> {
        self.pending_calls
            .iter()
            .map(|call| call.call_id.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed(RunOutput),
    AwaitingInput(AwaitingInput),
}

impl RunOutcome {
    pub fn into_output(self) -> Option<RunOutput> {
        match self {
            Self::Completed(output) => Some(output),
            Self::AwaitingInput(_) => None,
        }
    }

    pub fn is_awaiting_input(&self) -> bool {
        matches!(self, Self::AwaitingInput(_))
    }
}
