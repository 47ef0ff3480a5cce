//! Tests for tool-call stream tracking.

mod common;

use std::collections::HashMap;
use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use orbit::error::OrbitError;
use orbit::tracker::{ToolCallTracker, TrackerLimits, TrackerNotification};
use orbit::types::{FinalizePath, RunEvent};

use common::*;

fn feed(tracker: &mut ToolCallTracker, events: &[RunEvent]) -> Vec<TrackerNotification> {
    events
        .iter()
        .flat_map(|event| tracker.process_event(event).expect("process event"))
        .collect()
}

#[test]
fn concatenated_deltas_equal_the_streamed_arguments() {
    let mut tracker = ToolCallTracker::new(TrackerLimits::default());
    let fragments = ["{\"qu", "ery\":", "\"rust ", "tracing\"", "}"];
    let mut events = vec![call_started("c1", "search")];
    events.extend(fragments.iter().map(|f| call_args("c1", f)));
    feed(&mut tracker, &events);

    let call = &tracker.pending_calls()[0];
    assert_eq!(call.argument_chunks.concat(), fragments.concat());
    assert_eq!(call.accumulated_byte_size, fragments.concat().len());

    feed(&mut tracker, &[call_ended("c1")]);
    let call = &tracker.pending_calls()[0];
    assert_eq!(call.final_arguments.as_deref(), Some(fragments.concat().as_str()));
}

#[test]
fn oversized_arguments_fail_and_leave_no_stale_state() {
    let mut tracker = ToolCallTracker::new(TrackerLimits::default());
    tracker.process_event(&call_started("big", "upload")).expect("start");
    let half = "a".repeat(512 * 1024);
    tracker.process_event(&call_args("big", &half)).expect("first half fits");
    tracker.process_event(&call_args("big", &half)).expect("exactly 1 MiB fits");

    let err = tracker
        .process_event(&call_args("big", "b"))
        .expect_err("over the limit");

    assert!(matches!(
        err,
        OrbitError::ToolArgumentsTooLarge { ref call_id, limit } if call_id == "big" && limit == 1024 * 1024
    ));
    assert!(!tracker.is_tracked("big"));
    assert!(tracker.pending_calls().is_empty());
    assert!(tracker.process_event(&call_args("big", "c")).expect("ignored").is_empty());
}

#[test]
fn args_and_chunk_events_are_interchangeable() {
    let mut with_args = ToolCallTracker::new(TrackerLimits::default());
    let mut with_chunks = ToolCallTracker::new(TrackerLimits::default());

    feed(
        &mut with_args,
        &[call_started("c1", "t"), call_args("c1", "{\"a\":"), call_args("c1", "1}"), call_ended("c1")],
    );
    feed(
        &mut with_chunks,
        &[call_started("c1", "t"), call_chunk("c1", "{\"a\":"), call_args("c1", "1}"), call_ended("c1")],
    );

    assert_eq!(with_args.pending_calls(), with_chunks.pending_calls());
}

#[test]
fn calls_outside_the_allow_list_are_never_tracked() {
    let mut tracker = ToolCallTracker::with_allow_list(["confirm"], TrackerLimits::default());

    feed(
        &mut tracker,
        &[
            call_started("c1", "search"),
            call_args("c1", "{}"),
            call_ended("c1"),
            call_started("c2", "confirm"),
            call_args("c2", "{}"),
        ],
    );

    assert!(!tracker.is_tracked("c1"));
    assert!(tracker.is_tracked("c2"));
    assert_eq!(tracker.pending_call_ids(), vec!["c2".to_string()]);
}

#[test]
fn interleaved_calls_are_kept_apart() {
    let mut tracker = ToolCallTracker::new(TrackerLimits::default());
    feed(
        &mut tracker,
        &[
            call_started("a", "t"),
            call_started("b", "t"),
            call_args("a", "{\"x\":"),
            call_args("b", "{\"y\":"),
            call_args("b", "2}"),
            call_args("a", "1}"),
            call_ended("b"),
            call_ended("a"),
        ],
    );

    let mut calls = tracker.pending_calls();
    calls.sort_by(|l, r| l.call_id.cmp(&r.call_id));
    assert_eq!(calls[0].final_arguments.as_deref(), Some("{\"x\":1}"));
    assert_eq!(calls[1].final_arguments.as_deref(), Some("{\"y\":2}"));
}

#[test]
fn calls_stay_pending_until_a_result_arrives() {
    let mut tracker = ToolCallTracker::new(TrackerLimits::default());
    feed(&mut tracker, &[call_started("c1", "t"), call_ended("c1")]);
    assert_eq!(tracker.pending_call_ids(), vec!["c1".to_string()]);

    feed(&mut tracker, &[call_result("c1", "ok")]);
    assert!(tracker.pending_call_ids().is_empty());
}

#[test]
fn finalize_reconciles_and_falls_back() {
    let schemas = HashMap::from([(
        "weather".to_string(),
        json!({
            "type": "object",
            "properties": {
                "city": { "type": "string" },
                "unit": { "type": "string", "default": "c" },
            },
            "required": ["city"],
        }),
    )]);
    let mut tracker = ToolCallTracker::new(TrackerLimits::default()).with_schemas(schemas);

    let notes = feed(
        &mut tracker,
        &[
            call_started("ok", "weather"),
            call_args("ok", r#"{"city":"Rome","unit":null,"_orbit_trace":"t1"}"#),
            call_ended("ok"),
            call_started("bad", "weather"),
            call_args("bad", r#"{"city":"#),
            call_ended("bad"),
        ],
    );

    let finalized: Vec<(String, FinalizePath, String)> = notes
        .into_iter()
        .filter_map(|note| match note {
            TrackerNotification::ArgumentsFinalized {
                call_id,
                path,
                arguments,
                ..
            } => Some((call_id, path, arguments)),
            TrackerNotification::ArgumentsDelta { .. } => None,
        })
        .collect();

    assert_eq!(finalized.len(), 2);
    assert_eq!(finalized[0].1, FinalizePath::Reconciled);
    let reconciled: Value = serde_json::from_str(&finalized[0].2).expect("json");
    assert_eq!(
        reconciled,
        json!({ "city": "Rome", "unit": "c", "_orbit_trace": "t1" })
    );
    assert_eq!(finalized[1], ("bad".to_string(), FinalizePath::RawFallback, r#"{"city":"#.to_string()));
}

#[test]
fn argument_near_the_ceiling_streams_in_linear_time() {
    let schemas = HashMap::from([(
        "search".to_string(),
        json!({
            "type": "object",
            "properties": { "query": { "type": "string" } },
            "required": ["query"],
        }),
    )]);
    let mut tracker = ToolCallTracker::new(TrackerLimits::default()).with_schemas(schemas);
    let limit = tracker.limits().max_argument_bytes;
    let query = "q".repeat(limit - 64);
    let arguments = format!(r#"{{"query":"{query}"}}"#);
    assert!(arguments.len() <= limit);

    let started = Instant::now();
    tracker.process_event(&call_started("c1", "search")).expect("start");
    let mut notifications = 0;
    for piece in arguments.as_bytes().chunks(16) {
        let delta = std::str::from_utf8(piece).expect("ascii");
        notifications += tracker
            .process_event(&call_args("c1", delta))
            .expect("delta")
            .len();
    }
    let finalized = tracker.process_event(&call_ended("c1")).expect("end");
    let elapsed = started.elapsed();

    assert_eq!(notifications, arguments.len().div_ceil(16));
    assert!(
        elapsed < Duration::from_secs(10),
        "streaming {} bytes took {elapsed:?}",
        arguments.len()
    );
    match &finalized[..] {
        [TrackerNotification::ArgumentsFinalized { arguments: reconciled, path, .. }] => {
            assert_eq!(*path, FinalizePath::Reconciled);
            assert_eq!(reconciled, &arguments);
        }
        other => panic!("unexpected notifications: {other:?}"),
    }
}
