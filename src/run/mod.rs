//! Run controller: drives rounds until the model stops asking for tools.

mod controller;
pub mod round;
pub mod types;

#[cfg(test)]
mod tests;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bon::Builder;
use tokio_util::sync::CancellationToken;

use crate::tools::ToolDescriptor;
use crate::tracker::TrackerNotification;
use crate::types::RunEvent;

pub use controller::RunController;
pub use round::RunRound;
pub use types::{AwaitingInput, RunOutcome, RunOutput, RunState};

/// Called inline for every stream event, in arrival order.
pub type RunObserver = Arc<dyn Fn(&RunEvent) + Send + Sync>;

/// Receives tracker notifications (argument deltas, finalized arguments).
pub type NotificationSink = Arc<dyn Fn(TrackerNotification) + Send + Sync>;

/// Awaited after each tool round with the new round number; `false` aborts.
pub type RoundCheckpoint =
    Arc<dyn Fn(usize) -> Pin<Box<dyn Future<Output = bool> + Send>> + Send + Sync>;

/// Per-run knobs. Anything unset falls back to the controller's config.
#[derive(Clone, Default, Builder)]
pub struct RunOptions {
    pub observer: Option<RunObserver>,
    pub notification_sink: Option<NotificationSink>,
    pub checkpoint: Option<RoundCheckpoint>,
    #[builder(default)]
    pub cancel: CancellationToken,
    pub max_tool_rounds: Option<usize>,
    /// Tools offered to the model but resolved by the caller.
    #[builder(default)]
    pub client_tools: Vec<ToolDescriptor>,
}

impl std::fmt::Debug for RunOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunOptions")
            .field("observer", &self.observer.is_some())
            .field("notification_sink", &self.notification_sink.is_some())
            .field("checkpoint", &self.checkpoint.is_some())
            .field("max_tool_rounds", &self.max_tool_rounds)
            .field(
                "client_tools",
                &self.client_tools.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
