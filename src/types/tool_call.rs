//! Snapshot of a tool call the tracker is waiting on.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How a call's final arguments were produced.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FinalizePath {
    /// Parsed and reconciled against the tool's original schema.
    Reconciled,
    /// A schema was registered but reconciliation failed; raw text kept.
    RawFallback,
    /// No schema registered; raw text kept.
    Unchecked,
}

/// A tool call seen in the stream and not yet answered by a result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PendingToolCall {
    pub call_id: String,
    pub tool_name: String,
    pub argument_chunks: Vec<String>,
    pub accumulated_byte_size: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_arguments: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finalize_path: Option<FinalizePath>,
}

impl PendingToolCall {
    pub fn new(call_id: impl Into<String>, tool_name: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            tool_name: tool_name.into(),
            argument_chunks: Vec::new(),
            accumulated_byte_size: 0,
            final_arguments: None,
            finalize_path: None,
        }
    }

    /// Whether the call's end event has been seen.
    pub fn is_finalized(&self) -> bool {
        self.final_arguments.is_some()
    }

    /// Arguments to execute with: the finalized text, or whatever was
    /// buffered when the end event never arrived.
    pub fn effective_arguments(&self) -> String {
        match &self.final_arguments {
            Some(args) => args.clone(),
            None => self.argument_chunks.concat(),
        }
    }
}
