use super::*;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use pretty_assertions::assert_eq;
use serde_json::json;

use crate::config::OrbitConfig;
use crate::error::OrbitError;
use crate::tools::ToolRegistry;
use crate::tracker::TrackerNotification;
use crate::transport::ScriptedTransport;
use crate::types::{FinalizePath, RunEvent, ToolResult};

mod support;

mod client_tools;

use support::{
    checkpoint, controller, echo_tool, failing_tool, registry_with, text_round, tool_call_round,
};
