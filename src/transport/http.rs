//! Streaming HTTP transport: POST the round request, read SSE events back.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::{RunEventStream, RunRequest, RunTransport};
use crate::config::OrbitConfig;
use crate::error::{OrbitError, Result};
use crate::types::RunEvent;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);
const REQUEST_ID_HEADER: &str = "x-request-id";

/// Run transport speaking JSON-over-POST with a server-sent-events reply.
#[derive(Debug, Clone)]
pub struct HttpRunTransport {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpRunTransport {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .pool_max_idle_per_host(10)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        })
    }

    /// Build from `endpoint` and `api_key` in the config.
    pub fn from_config(config: &OrbitConfig) -> Result<Self> {
        let endpoint = config.endpoint.clone().ok_or_else(|| {
            OrbitError::Configuration("no run endpoint configured (ORBIT_ENDPOINT)".into())
        })?;
        Self::new(endpoint, config.api_key.clone())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));
        if let Some(key) = &self.api_key {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {key}")) {
                headers.insert(AUTHORIZATION, value);
            }
        }
        headers
    }
}

#[async_trait]
impl RunTransport for HttpRunTransport {
    async fn open_run(&self, request: &RunRequest, cancel: CancellationToken) -> Result<RunEventStream> {
        let request_id = Uuid::new_v4().to_string();
        let send = self
            .client
            .post(&self.endpoint)
            .headers(self.headers())
            .header(REQUEST_ID_HEADER, request_id.as_str())
            .json(request)
            .send();
        let resp = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(OrbitError::Canceled),
            resp = send => resp?,
        };

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(OrbitError::api(status, body));
        }
        tracing::debug!(
            endpoint = %self.endpoint,
            request_id = %request_id,
            previous_run_id = ?request.previous_run_id,
            "run stream open"
        );

        let byte_stream = resp.bytes_stream();
        let stream = async_stream::stream! {
            let mut buffer: Vec<u8> = Vec::new();
            futures::pin_mut!(byte_stream);

            loop {
                let next = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => None,
                    next = byte_stream.next() => Some(next),
                };
                let chunk = match next {
                    None => {
                        yield Err(OrbitError::Canceled);
                        break;
                    }
                    Some(Some(Ok(bytes))) => bytes,
                    Some(Some(Err(err))) => {
                        yield Err(OrbitError::Network(err));
                        break;
                    }
                    Some(None) => break,
                };

                buffer.extend_from_slice(&chunk);

                while let Some(line_end) = buffer.iter().position(|byte| *byte == b'\n') {
                    let line: Vec<u8> = buffer.drain(..=line_end).collect();
                    if let Some(event) = decode_line(&line[..line_end]) {
                        yield Ok(event);
                    }
                }
            }

            if let Some(event) = decode_line(&buffer) {
                yield Ok(event);
            }
        };

        Ok(Box::pin(stream))
    }
}

/// Extract the payload of an SSE `data:` line, `None` for `[DONE]`.
pub fn parse_sse_data(line: &str) -> Option<&str> {
    let data = line.strip_prefix("data:")?.trim_start();
    if data.is_empty() || data == "[DONE]" {
        return None;
    }
    Some(data)
}

/// Decode one complete line; characters split across network chunks are
/// only decoded once the whole line has arrived.
fn decode_line(line: &[u8]) -> Option<RunEvent> {
    match std::str::from_utf8(line) {
        Ok(text) => parse_event_line(text.trim()),
        Err(err) => {
            tracing::warn!(error = %err, "skipping run event line that is not valid UTF-8");
            None
        }
    }
}

fn parse_event_line(line: &str) -> Option<RunEvent> {
    if line.is_empty() || line.starts_with(':') {
        return None;
    }
    let data = parse_sse_data(line)?;
    match serde_json::from_str::<RunEvent>(data) {
        Ok(event) => Some(event),
        Err(err) => {
            tracing::warn!(error = %err, "skipping unparseable run event");
            None
        }
    }
}
