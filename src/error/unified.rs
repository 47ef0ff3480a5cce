//! Unified error classification and recovery.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Broad error category for routing recovery logic.
///
/// Callers use this to tell "the model/transport failed" apart from
/// "a tool failed" and "the run exceeded its safety bounds".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorCategory {
    Transport,
    ToolExecution,
    SafetyBounds,
    Configuration,
    Canceled,
    Serialization,
    Schema,
    Unknown,
}

/// Suggested recovery action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverySuggestion {
    RetryWithBackoff,
    CheckCredentials,
    CheckConfiguration,
    CheckToolImplementation,
    RaiseLimits,
    ReduceInputSize,
    None,
}
