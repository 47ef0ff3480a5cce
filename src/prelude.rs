//! Convenience re-exports for common use.

pub use crate::config::OrbitConfig;
pub use crate::error::{OrbitError, Result};
pub use crate::run::{AwaitingInput, RunController, RunOptions, RunOutcome, RunOutput};
pub use crate::tools::{AgentTool, Tool, ToolArguments, ToolParameters, ToolRegistry};
pub use crate::tracker::{ToolCallTracker, TrackerLimits, TrackerNotification};
pub use crate::transport::{HttpRunTransport, RunTransport, ScriptedTransport};
pub use crate::types::{OutgoingMessage, PendingToolCall, RunEvent, ToolResult};
