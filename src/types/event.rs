//! Run event stream types.

use serde::{Deserialize, Serialize};

/// A single event emitted by the model endpoint during one round.
///
/// Events for one call id are strictly ordered (started, zero or more
/// argument deltas, ended, optional result); different call ids may
/// interleave.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum RunEvent {
    RunStarted {
        run_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        thread_id: Option<String>,
    },
    #[serde(alias = "TEXT_MESSAGE_CONTENT")]
    TextDelta {
        #[serde(alias = "delta")]
        text: String,
    },
    #[serde(rename = "TOOL_CALL_START", alias = "TOOL_CALL_STARTED")]
    ToolCallStarted {
        #[serde(rename = "toolCallId")]
        call_id: String,
        #[serde(rename = "toolCallName")]
        tool_name: String,
    },
    ToolCallArgs {
        #[serde(rename = "toolCallId")]
        call_id: String,
        delta: String,
    },
    ToolCallChunk {
        #[serde(rename = "toolCallId")]
        call_id: String,
        delta: String,
    },
    #[serde(rename = "TOOL_CALL_END", alias = "TOOL_CALL_ENDED")]
    ToolCallEnded {
        #[serde(rename = "toolCallId")]
        call_id: String,
    },
    ToolCallResult {
        #[serde(rename = "toolCallId")]
        call_id: String,
        content: String,
    },
    RunFinished,
    RunError {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code: Option<String>,
    },
}

impl RunEvent {
    /// Call id and delta of an argument fragment, for either the ARGS or
    /// CHUNK spelling.
    pub fn args_delta(&self) -> Option<(&str, &str)> {
        match self {
            Self::ToolCallArgs { call_id, delta } | Self::ToolCallChunk { call_id, delta } => {
                Some((call_id.as_str(), delta.as_str()))
            }
            _ => None,
        }
    }
}
