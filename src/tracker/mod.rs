//! Tool-call stream tracking.
//!
//! Folds the per-call event sequence (started, argument deltas, ended,
//! result) of one run into [`PendingToolCall`] snapshots. Argument text is
//! accumulated under a byte ceiling and, when the tool's original schema is
//! known, reconciled on completion.

pub mod partial_json;

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::config::{OrbitConfig, DEFAULT_MAX_TOOL_ARGUMENT_BYTES, DEFAULT_PASS_THROUGH_PREFIX};
use crate::error::{OrbitError, Result};
use crate::schema::{reconcile_node, SchemaNode};
use crate::types::{FinalizePath, PendingToolCall, RunEvent};

pub use partial_json::parse_partial;

/// Buffers up to this size get a partial parse on every delta.
const PREVIEW_EAGER_BYTES: usize = 1024;
/// Past the eager size, a partial parse runs once this many new bytes arrive.
const PREVIEW_STRIDE_BYTES: usize = 512;
/// No partial parse is attempted for buffers larger than this.
const PREVIEW_MAX_BYTES: usize = 16 * 1024;

/// Bounds applied while accumulating arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerLimits {
    /// Ceiling on a single call's accumulated argument bytes.
    pub max_argument_bytes: usize,
    /// Argument keys with this prefix survive reconciliation untouched.
    pub pass_through_prefix: String,
}

impl Default for TrackerLimits {
    fn default() -> Self {
        Self {
            max_argument_bytes: DEFAULT_MAX_TOOL_ARGUMENT_BYTES,
            pass_through_prefix: DEFAULT_PASS_THROUGH_PREFIX.to_string(),
        }
    }
}

impl TrackerLimits {
    pub fn from_config(config: &OrbitConfig) -> Self {
        Self {
            max_argument_bytes: config.max_tool_argument_bytes,
            pass_through_prefix: config.pass_through_prefix.clone(),
        }
    }
}

/// Progress reports produced while folding events.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerNotification {
    /// An argument fragment arrived for a call whose tool has a schema.
    ArgumentsDelta {
        call_id: String,
        tool_name: String,
        delta: String,
        /// Best-effort parse of everything buffered so far. `None` when the
        /// buffer cannot be parsed yet, or when the preview was skipped for
        /// this delta because the buffer is large.
        partial: Option<Value>,
    },
    /// A call's arguments are complete.
    ArgumentsFinalized {
        call_id: String,
        tool_name: String,
        arguments: String,
        path: FinalizePath,
    },
}

/// Running argument text of a schema-bound call, for previews.
#[derive(Debug, Default)]
struct PreviewBuffer {
    text: String,
    parsed_len: usize,
}

impl PreviewBuffer {
    fn push(&mut self, delta: &str) -> Option<Value> {
        self.text.push_str(delta);
        let len = self.text.len();
        let due = len <= PREVIEW_EAGER_BYTES
            || (len <= PREVIEW_MAX_BYTES && len - self.parsed_len >= PREVIEW_STRIDE_BYTES);
        if !due {
            return None;
        }
        self.parsed_len = len;
        parse_partial(&self.text)
    }
}

/// Per-run tracker of in-flight tool calls.
#[derive(Debug)]
pub struct ToolCallTracker {
    pending: HashMap<String, PendingToolCall>,
    previews: HashMap<String, PreviewBuffer>,
    allow_list: Option<HashSet<String>>,
    schemas: HashMap<String, SchemaNode>,
    limits: TrackerLimits,
}

impl ToolCallTracker {
    /// Track calls to every tool.
    pub fn new(limits: TrackerLimits) -> Self {
        Self {
            pending: HashMap::new(),
            previews: HashMap::new(),
            allow_list: None,
            schemas: HashMap::new(),
            limits,
        }
    }

    /// Track only calls to the named tools.
    pub fn with_allow_list<I, S>(names: I, limits: TrackerLimits) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allow_list: Some(names.into_iter().map(Into::into).collect()),
            ..Self::new(limits)
        }
    }

    /// Register original input schemas, keyed by tool name.
    pub fn with_schemas(mut self, schemas: HashMap<String, Value>) -> Self {
        self.schemas = schemas
            .iter()
            .map(|(name, schema)| (name.clone(), SchemaNode::from_json(schema)))
            .collect();
        self
    }

    pub fn limits(&self) -> &TrackerLimits {
        &self.limits
    }

    /// Fold one event into the pending set.
    ///
    /// Only an argument-size violation is an error; the offending call is
    /// dropped before returning it.
    pub fn process_event(&mut self, event: &RunEvent) -> Result<Vec<TrackerNotification>> {
        if let Some((call_id, delta)) = event.args_delta() {
            return self.on_delta(call_id, delta);
        }
        match event {
            RunEvent::ToolCallStarted { call_id, tool_name } => {
                self.on_started(call_id, tool_name);
                Ok(Vec::new())
            }
            RunEvent::ToolCallEnded { call_id } => Ok(self.on_ended(call_id).into_iter().collect()),
            RunEvent::ToolCallResult { call_id, .. } => {
                self.previews.remove(call_id);
                if self.pending.remove(call_id).is_some() {
                    tracing::debug!(call_id = %call_id, "tool call resolved in stream");
                }
                Ok(Vec::new())
            }
            RunEvent::RunStarted { .. }
            | RunEvent::TextDelta { .. }
            | RunEvent::ToolCallArgs { .. }
            | RunEvent::ToolCallChunk { .. }
            | RunEvent::RunFinished
            | RunEvent::RunError { .. } => Ok(Vec::new()),
        }
    }

    pub fn is_tracked(&self, call_id: &str) -> bool {
        self.pending.contains_key(call_id)
    }

    /// Snapshot of every call seen but not yet resolved.
    pub fn pending_calls(&self) -> Vec<PendingToolCall> {
        self.pending.values().cloned().collect()
    }

    pub fn pending_call_ids(&self) -> Vec<String> {
        self.pending.keys().cloned().collect()
    }

    fn on_started(&mut self, call_id: &str, tool_name: &str) {
        if let Some(allowed) = &self.allow_list {
            if !allowed.contains(tool_name) {
                tracing::debug!(call_id, tool = tool_name, "tool call not allow-listed; not tracking");
                return;
            }
        }
        if self.pending.contains_key(call_id) {
            tracing::warn!(call_id, tool = tool_name, "tool call started twice; restarting");
        }
        self.previews.remove(call_id);
        self.pending
            .insert(call_id.to_string(), PendingToolCall::new(call_id, tool_name));
    }

    fn on_delta(&mut self, call_id: &str, delta: &str) -> Result<Vec<TrackerNotification>> {
        let limit = self.limits.max_argument_bytes;
        let Some(call) = self.pending.get_mut(call_id) else {
            if self.allow_list.is_some() {
                tracing::debug!(call_id, "argument delta for untracked tool call");
            } else {
                tracing::warn!(call_id, "argument delta for unknown tool call");
            }
            return Ok(Vec::new());
        };

        if call.accumulated_byte_size + delta.len() > limit {
            self.pending.remove(call_id);
            self.previews.remove(call_id);
            return Err(OrbitError::ToolArgumentsTooLarge {
                call_id: call_id.to_string(),
                limit,
            });
        }

        call.argument_chunks.push(delta.to_string());
        call.accumulated_byte_size += delta.len();

        if !self.schemas.contains_key(&call.tool_name) {
            return Ok(Vec::new());
        }
        let partial = self
            .previews
            .entry(call_id.to_string())
            .or_default()
            .push(delta);
        Ok(vec![TrackerNotification::ArgumentsDelta {
            call_id: call_id.to_string(),
            tool_name: call.tool_name.clone(),
            delta: delta.to_string(),
            partial,
        }])
    }

    fn on_ended(&mut self, call_id: &str) -> Option<TrackerNotification> {
        let Some(call) = self.pending.get_mut(call_id) else {
            if self.allow_list.is_some() {
                tracing::debug!(call_id, "end event for untracked tool call");
            } else {
                tracing::warn!(call_id, "end event for unknown tool call");
            }
            return None;
        };
        self.previews.remove(call_id);

        let raw = call.argument_chunks.concat();
        let (arguments, path) = match self.schemas.get(&call.tool_name) {
            Some(schema) => match finalize_with_schema(schema, &raw, &self.limits.pass_through_prefix) {
                Ok(reconciled) => (reconciled, FinalizePath::Reconciled),
                Err(err) => {
                    tracing::warn!(
                        call_id,
                        tool = %call.tool_name,
                        error = %err,
                        "could not reconcile tool arguments; using raw text"
                    );
                    (raw, FinalizePath::RawFallback)
                }
            },
            None => (raw, FinalizePath::Unchecked),
        };

        call.argument_chunks.clear();
        call.accumulated_byte_size = 0;
        call.final_arguments = Some(arguments.clone());
        call.finalize_path = Some(path);

        Some(TrackerNotification::ArgumentsFinalized {
            call_id: call_id.to_string(),
            tool_name: call.tool_name.clone(),
            arguments,
            path,
        })
    }
}

fn finalize_with_schema(schema: &SchemaNode, raw: &str, prefix: &str) -> Result<String> {
    let trimmed = raw.trim();
    let parsed: Value = if trimmed.is_empty() {
        Value::Object(Default::default())
    } else {
        serde_json::from_str(trimmed)?
    };
    let reconciled = reconcile_node(schema, &parsed, prefix)?;
    Ok(serde_json::to_string(&reconciled)?)
}
