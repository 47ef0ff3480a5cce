use super::*;
use pretty_assertions::assert_eq;

use crate::tools::ToolDescriptor;

fn confirm_tool() -> ToolDescriptor {
    ToolDescriptor {
        name: "confirm".into(),
        description: "Ask the user to confirm".into(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "question": { "type": "string" },
                "detail": { "type": "string" },
            },
            "required": ["question"],
        }),
        output_schema: None,
    }
}

fn mixed_round() -> Vec<RunEvent> {
    vec![
        RunEvent::RunStarted {
            run_id: "run-0".into(),
            thread_id: None,
        },
        RunEvent::ToolCallStarted {
            call_id: "local".into(),
            tool_name: "echo".into(),
        },
        RunEvent::ToolCallArgs {
            call_id: "local".into(),
            delta: r#"{"text":"L"}"#.into(),
        },
        RunEvent::ToolCallEnded {
            call_id: "local".into(),
        },
        RunEvent::ToolCallStarted {
            call_id: "remote".into(),
            tool_name: "confirm".into(),
        },
        RunEvent::ToolCallChunk {
            call_id: "remote".into(),
            delta: r#"{"question":"ok?","detail":null}"#.into(),
        },
        RunEvent::ToolCallEnded {
            call_id: "remote".into(),
        },
        RunEvent::RunFinished,
    ]
}

#[tokio::test]
async fn client_tools_pause_the_run_and_resume_continues_it() {
    let transport = ScriptedTransport::new();
    transport
        .push_round(mixed_round())
        .push_round(text_round("run-1", &["confirmed"]));
    let controller = controller(&transport, Some(registry_with(vec![echo_tool()])));
    let options = RunOptions::builder().client_tools(vec![confirm_tool()]).build();

    let outcome = controller.run("x", options.clone()).await.expect("run");
    let RunOutcome::AwaitingInput(awaiting) = outcome else {
        panic!("expected the run to wait for client input");
    };

    assert_eq!(awaiting.previous_run_id.as_deref(), Some("run-0"));
    assert_eq!(awaiting.round, 1);
    assert_eq!(awaiting.pending_call_ids(), vec!["remote"]);
    assert_eq!(
        awaiting.pending_calls[0].final_arguments.as_deref(),
        Some(r#"{"question":"ok?"}"#)
    );
    assert_eq!(awaiting.local_results.len(), 1);
    assert_eq!(awaiting.local_results[0].text(), "L");

    let offered = transport.requests()[0].tools.clone().expect("tools");
    let mut names: Vec<&str> = offered.iter().map(|tool| tool.name.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["confirm", "echo"]);

    let output = controller
        .resume(awaiting, vec![ToolResult::success("remote", "yes")], options)
        .await
        .expect("resume")
        .into_output()
        .expect("completed");

    assert_eq!(output.text, "confirmed");
    assert_eq!(output.rounds, 2);
    let second = &transport.requests()[1];
    assert_eq!(second.previous_run_id.as_deref(), Some("run-0"));
    let ids: Vec<&str> = second
        .message
        .tool_results_ref()
        .iter()
        .map(|result| result.call_id.as_str())
        .collect();
    assert_eq!(ids, vec!["local", "remote"]);
}

#[tokio::test]
async fn client_tools_work_without_a_registry() {
    let transport = ScriptedTransport::new();
    transport.push_round(tool_call_round(
        "run-0",
        "remote",
        "confirm",
        r#"{"question":"sure?"}"#,
    ));
    let controller = controller(&transport, None);
    let options = RunOptions::builder().client_tools(vec![confirm_tool()]).build();

    let outcome = controller.run("x", options).await.expect("run");

    assert!(outcome.is_awaiting_input());
}

#[tokio::test]
async fn resume_requires_every_client_result() {
    let transport = ScriptedTransport::new();
    transport.push_round(mixed_round());
    let controller = controller(&transport, Some(registry_with(vec![echo_tool()])));
    let options = RunOptions::builder().client_tools(vec![confirm_tool()]).build();

    let RunOutcome::AwaitingInput(awaiting) =
        controller.run("x", options.clone()).await.expect("run")
    else {
        panic!("expected the run to wait for client input");
    };
    let err = controller
        .resume(awaiting, Vec::new(), options)
        .await
        .expect_err("missing result");

    assert!(matches!(err, OrbitError::InvalidArgument(_)));
    assert_eq!(transport.request_count(), 1);
}
