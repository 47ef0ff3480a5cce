//! In-memory transport that replays canned rounds.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use super::{RunEventStream, RunRequest, RunTransport};
use crate::error::{OrbitError, Result};
use crate::types::RunEvent;

/// Replays one queued script per opened round and records every request.
///
/// Once the queue is exhausted the last script is repeated, which makes a
/// model that keeps asking for the same tool easy to express.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    scripts: Arc<Mutex<VecDeque<Vec<Result<RunEvent>>>>>,
    last: Arc<Mutex<Option<Vec<RunEvent>>>>,
    requests: Arc<Mutex<Vec<RunRequest>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a round made of `events`.
    pub fn push_round(&self, events: Vec<RunEvent>) -> &Self {
        self.push_fallible_round(events.into_iter().map(Ok).collect())
    }

    /// Queue a round whose stream may yield errors.
    pub fn push_fallible_round(&self, events: Vec<Result<RunEvent>>) -> &Self {
        if let Ok(mut scripts) = self.scripts.lock() {
            scripts.push_back(events);
        }
        self
    }

    /// Requests seen so far, in order.
    pub fn requests(&self) -> Vec<RunRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|requests| requests.len()).unwrap_or(0)
    }

    fn next_script(&self) -> Option<Vec<Result<RunEvent>>> {
        let mut scripts = self.scripts.lock().ok()?;
        let mut last = self.last.lock().ok()?;
        match scripts.pop_front() {
            Some(script) => {
                let replayable: Option<Vec<RunEvent>> =
                    script.iter().map(|event| event.as_ref().ok().cloned()).collect();
                *last = replayable;
                Some(script)
            }
            None => last.clone().map(|events| events.into_iter().map(Ok).collect()),
        }
    }
}

#[async_trait]
impl RunTransport for ScriptedTransport {
    async fn open_run(&self, request: &RunRequest, cancel: CancellationToken) -> Result<RunEventStream> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        if cancel.is_cancelled() {
            return Err(OrbitError::Canceled);
        }
        let script = self
            .next_script()
            .ok_or_else(|| OrbitError::Stream("scripted transport has no rounds left".into()))?;
        Ok(tokio_stream::iter(script).boxed())
    }
}
