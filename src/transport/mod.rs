//! Model-invocation boundary: one streamed run per round.

pub mod http;
pub mod scripted;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::OrbitError;
use crate::tools::ToolDescriptor;
use crate::types::{OutgoingMessage, RunEvent};

pub use http::HttpRunTransport;
pub use scripted::ScriptedTransport;

/// Event stream for a single round.
pub type RunEventStream = BoxStream<'static, Result<RunEvent, OrbitError>>;

/// Body of one round's request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    pub message: OutgoingMessage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDescriptor>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_run_id: Option<String>,
}

/// Opens the event stream of one round.
///
/// Implementations should stop producing events once `cancel` fires.
#[async_trait]
pub trait RunTransport: Send + Sync {
    async fn open_run(
        &self,
        request: &RunRequest,
        cancel: CancellationToken,
    ) -> Result<RunEventStream, OrbitError>;
}
