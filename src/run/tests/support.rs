use super::*;

use crate::tools::{AgentTool, Tool, ToolParameters};

pub(super) fn text_round(run_id: &str, chunks: &[&str]) -> Vec<RunEvent> {
    let mut events = vec![RunEvent::RunStarted {
        run_id: run_id.to_string(),
        thread_id: None,
    }];
    events.extend(chunks.iter().map(|chunk| RunEvent::TextDelta {
        text: chunk.to_string(),
    }));
    events.push(RunEvent::RunFinished);
    events
}

/// A round that calls `tool` once, streaming `args` in two fragments.
pub(super) fn tool_call_round(run_id: &str, call_id: &str, tool: &str, args: &str) -> Vec<RunEvent> {
    let split = args.len() / 2;
    let (head, tail) = args.split_at(split);
    vec![
        RunEvent::RunStarted {
            run_id: run_id.to_string(),
            thread_id: None,
        },
        RunEvent::ToolCallStarted {
            call_id: call_id.to_string(),
            tool_name: tool.to_string(),
        },
        RunEvent::ToolCallArgs {
            call_id: call_id.to_string(),
            delta: head.to_string(),
        },
        RunEvent::ToolCallChunk {
            call_id: call_id.to_string(),
            delta: tail.to_string(),
        },
        RunEvent::ToolCallEnded {
            call_id: call_id.to_string(),
        },
        RunEvent::RunFinished,
    ]
}

pub(super) fn echo_tool() -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        "echo",
        "Echo text",
        ToolParameters::object()
            .string("text", "Text to echo", true)
            .string("note", "Optional note", false)
            .build(),
        |args, _ctx| async move { Ok(json!(args.get_str("text")?.to_string())) },
    ))
}

pub(super) fn failing_tool() -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        "fail",
        "Always fails",
        ToolParameters::empty(),
        |_args, ctx| async move {
            Err(OrbitError::ToolExecution {
                tool_name: ctx.tool_name.clone(),
                message: "disk on fire".to_string(),
            })
        },
    ))
}

pub(super) fn registry_with(tools: Vec<Arc<dyn Tool>>) -> Arc<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    for tool in tools {
        registry.register(tool).expect("register tool");
    }
    Arc::new(registry)
}

pub(super) fn controller(transport: &ScriptedTransport, registry: Option<Arc<ToolRegistry>>) -> RunController {
    let controller = RunController::new(Arc::new(transport.clone()));
    match registry {
        Some(registry) => controller.with_registry(registry),
        None => controller,
    }
}

/// Checkpoint answering with `verdict(round)`.
pub(super) fn checkpoint<F>(verdict: F) -> RoundCheckpoint
where
    F: Fn(usize) -> bool + Send + Sync + 'static,
{
    Arc::new(
        move |round: usize| -> Pin<Box<dyn Future<Output = bool> + Send>> {
            let answer = verdict(round);
            Box::pin(async move { answer })
        },
    )
}
