//! Shared test helpers: event scripts, SSE bodies and sample tools.
#![allow(dead_code)]

use std::sync::Arc;

use serde_json::json;

use orbit::error::OrbitError;
use orbit::tools::{AgentTool, Tool, ToolParameters, ToolRegistry};
use orbit::types::RunEvent;

pub fn run_started(run_id: &str) -> RunEvent {
    RunEvent::RunStarted {
        run_id: run_id.to_string(),
        thread_id: None,
    }
}

pub fn text(delta: &str) -> RunEvent {
    RunEvent::TextDelta {
        text: delta.to_string(),
    }
}

pub fn call_started(call_id: &str, tool: &str) -> RunEvent {
    RunEvent::ToolCallStarted {
        call_id: call_id.to_string(),
        tool_name: tool.to_string(),
    }
}

pub fn call_args(call_id: &str, delta: &str) -> RunEvent {
    RunEvent::ToolCallArgs {
        call_id: call_id.to_string(),
        delta: delta.to_string(),
    }
}

pub fn call_chunk(call_id: &str, delta: &str) -> RunEvent {
    RunEvent::ToolCallChunk {
        call_id: call_id.to_string(),
        delta: delta.to_string(),
    }
}

pub fn call_ended(call_id: &str) -> RunEvent {
    RunEvent::ToolCallEnded {
        call_id: call_id.to_string(),
    }
}

pub fn call_result(call_id: &str, content: &str) -> RunEvent {
    RunEvent::ToolCallResult {
        call_id: call_id.to_string(),
        content: content.to_string(),
    }
}

/// A complete round answering with `reply`.
pub fn text_round(run_id: &str, reply: &str) -> Vec<RunEvent> {
    vec![run_started(run_id), text(reply), RunEvent::RunFinished]
}

/// A complete round calling `tool` once with `args` in a single fragment.
pub fn tool_round(run_id: &str, call_id: &str, tool: &str, args: &str) -> Vec<RunEvent> {
    vec![
        run_started(run_id),
        call_started(call_id, tool),
        call_args(call_id, args),
        call_ended(call_id),
        RunEvent::RunFinished,
    ]
}

/// Server-sent-events body carrying `events`, one `data:` line each.
pub fn sse_body(events: &[RunEvent]) -> String {
    let mut body = String::new();
    for event in events {
        let payload = serde_json::to_string(event).expect("serialize event");
        body.push_str("data: ");
        body.push_str(&payload);
        body.push_str("\n\n");
    }
    body.push_str("data: [DONE]\n\n");
    body
}

/// Adds two integers.
pub fn add_tool() -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        "add",
        "Add two integers",
        ToolParameters::object()
            .integer("a", "Left operand", true)
            .integer("b", "Right operand", true)
            .build(),
        |args, _ctx| async move {
            let a = args.get_i64("a")?;
            let b = args.get_i64("b")?;
            Ok(json!({ "sum": a + b }))
        },
    ))
}

/// Looks up weather; `unit` is optional and not nullable.
pub fn weather_tool() -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        "weather",
        "Current weather for a city",
        ToolParameters::object()
            .string("city", "City name", true)
            .string_enum("unit", "Temperature unit", &["c", "f"], false)
            .default_value("unit", json!("c"))
            .build(),
        |args, _ctx| async move {
            let city = args.get_str("city")?;
            let unit = args.get_str_opt("unit").unwrap_or("default");
            Ok(json!(format!("{city}: 21 ({unit})")))
        },
    ))
}

/// Always fails with a tool execution error.
pub fn broken_tool() -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        "broken",
        "Never works",
        ToolParameters::empty(),
        |_args, ctx| async move {
            Err(OrbitError::ToolExecution {
                tool_name: ctx.tool_name.clone(),
                message: "upstream unavailable".to_string(),
            })
        },
    ))
}

pub fn registry(tools: Vec<Arc<dyn Tool>>) -> Arc<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    for tool in tools {
        registry.register(tool).expect("register tool");
    }
    Arc::new(registry)
}
