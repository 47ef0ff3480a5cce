//! Error types for Orbit.

pub mod unified;

pub use unified::{ErrorCategory, RecoverySuggestion};

use thiserror::Error;

/// Primary error type for all Orbit operations.
#[derive(Error, Debug)]
pub enum OrbitError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config file error: {0}")]
    ConfigFile(#[from] toml::de::Error),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Run failed: {}", .message.as_deref().unwrap_or("model reported a run error"))]
    RunFailed {
        message: Option<String>,
        code: Option<String>,
    },

    #[error("Tool call {call_id} arguments exceed the {limit} byte limit")]
    ToolArgumentsTooLarge { call_id: String, limit: usize },

    #[error("Tool calls were requested but no tool registry was provided")]
    MissingToolRegistry,

    #[error("Exceeded maximum tool rounds ({limit})")]
    MaxToolRoundsExceeded { limit: usize },

    #[error("Run aborted by round checkpoint after round {round}")]
    AbortedByCheckpoint { round: usize },

    #[error("Run canceled")]
    Canceled,

    #[error("Tool execution error: {tool_name}: {message}")]
    ToolExecution { tool_name: String, message: String },

    #[error("Tool already registered: {0}")]
    DuplicateTool(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl OrbitError {
    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Api { .. } | Self::Network(_) | Self::Stream(_) | Self::RunFailed { .. } => {
                ErrorCategory::Transport
            }
            Self::ToolArgumentsTooLarge { .. }
            | Self::MaxToolRoundsExceeded { .. }
            | Self::AbortedByCheckpoint { .. } => ErrorCategory::SafetyBounds,
            Self::Configuration(_)
            | Self::ConfigFile(_)
            | Self::MissingToolRegistry
            | Self::DuplicateTool(_) => ErrorCategory::Configuration,
            Self::ToolExecution { .. } => ErrorCategory::ToolExecution,
            Self::Canceled => ErrorCategory::Canceled,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::Schema(_) | Self::InvalidArgument(_) => ErrorCategory::Schema,
            Self::Io(_) => ErrorCategory::Unknown,
        }
    }

    /// Whether this error is potentially retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Api { status, .. } => *status == 429 || (500..=599).contains(status),
            Self::Network(_) | Self::Stream(_) => true,
            _ => false,
        }
    }

    /// Suggest recovery actions.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self {
            Self::Api { status: 401 | 403, .. } => RecoverySuggestion::CheckCredentials,
            Self::ToolArgumentsTooLarge { .. } => RecoverySuggestion::ReduceInputSize,
            Self::MaxToolRoundsExceeded { .. } => RecoverySuggestion::RaiseLimits,
            _ if self.is_retryable() => RecoverySuggestion::RetryWithBackoff,
            _ => match self.category() {
                ErrorCategory::Configuration => RecoverySuggestion::CheckConfiguration,
                ErrorCategory::ToolExecution | ErrorCategory::Schema => {
                    RecoverySuggestion::CheckToolImplementation
                }
                _ => RecoverySuggestion::None,
            },
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, OrbitError>;
