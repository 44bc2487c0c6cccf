// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Integration tests for tapfmt-parser
//!
//! These tests tokenize realistic TAP documents from `tests/fixtures` and
//! check the event stream and the final verdict.

use std::path::Path;

use similar_asserts::assert_eq;
use tapfmt_parser::{DirectiveKind, TapEvent, Tokenizer, tokenize};

/// Get the fixtures directory for test data
fn fixtures_dir() -> std::path::PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    Path::new(&manifest_dir).join("tests/fixtures")
}

fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(fixtures_dir().join(name))
        .unwrap_or_else(|e| panic!("Failed to read fixture {name}: {e}"))
}

fn assertions(events: &[TapEvent]) -> Vec<&tapfmt_parser::Assertion> {
    events
        .iter()
        .filter_map(|e| match e {
            TapEvent::Assert(a) => Some(a),
            _ => None,
        })
        .collect()
}

fn final_results(events: &[TapEvent]) -> &tapfmt_parser::FinalResults {
    match events.last() {
        Some(TapEvent::Complete(results)) => results,
        other => panic!("stream must end with Complete, got {other:?}"),
    }
}

#[test]
fn test_flat_fixture() {
    let events = tokenize(&read_fixture("flat.tap"));
    let asserts = assertions(&events);

    assert_eq!(asserts.len(), 4);
    assert_eq!(asserts[1].time.map(|t| t.as_millis()), Some(3));

    let failed = asserts[2];
    assert!(failed.is_failure());
    let diagnostics = failed.diagnostics.as_ref().expect("diagnostics");
    assert_eq!(
        diagnostics.message().as_deref(),
        Some("expected 2026-01-17 but got 2026-01-18")
    );
    assert!(
        diagnostics
            .stack()
            .is_some_and(|s| s.contains("lib/date.js:12:3"))
    );

    assert_eq!(
        asserts[3].directive.as_ref().map(|d| d.kind),
        Some(DirectiveKind::Skip)
    );

    let results = final_results(&events);
    assert!(!results.ok);
    assert_eq!(results.count, 4);
    assert_eq!(results.fail, 1);
    assert_eq!(results.skip, 1);

    let comments = events
        .iter()
        .filter(|e| matches!(e, TapEvent::Comment { .. }))
        .count();
    assert_eq!(comments, 4);
}

#[test]
fn test_node_tap_fixture_structure() {
    let events = tokenize(&read_fixture("node-tap.tap"));

    let structure: Vec<String> = events
        .iter()
        .filter_map(|e| match e {
            TapEvent::SubtestStart { name } => Some(format!("+{name}")),
            TapEvent::SubtestEnd { summary } => Some(format!(
                "-{}",
                summary.as_ref().map(|a| a.name.as_str()).unwrap_or("")
            )),
            TapEvent::Assert(a) => Some(a.name.clone()),
            _ => None,
        })
        .collect();

    assert_eq!(
        structure,
        vec![
            "+test/math.js",
            "+addition",
            "adds positives",
            "adds negatives",
            "-addition",
            "+division",
            "divides by zero",
            "-division",
            "-test/math.js",
            "+test/string.js",
            "concatenates",
            "-test/string.js",
        ]
    );

    let results = final_results(&events);
    assert!(!results.ok);
    assert_eq!(results.count, 2);
    assert_eq!(results.fail, 1);
}

#[test]
fn test_node_tap_summary_keeps_yaml() {
    let events = tokenize(&read_fixture("node-tap.tap"));
    let summary = events
        .iter()
        .find_map(|e| match e {
            TapEvent::SubtestEnd {
                summary: Some(summary),
            } if summary.name == "test/math.js" => Some(summary),
            _ => None,
        })
        .expect("math summary");

    assert!(!summary.ok);
    assert_eq!(
        summary
            .diagnostics
            .as_ref()
            .and_then(|d| d.field("exitCode"))
            .as_deref(),
        Some("1")
    );
}

#[test]
fn test_bailout_fixture() {
    let events = tokenize(&read_fixture("bailout.tap"));
    assert_eq!(assertions(&events).len(), 1);

    let results = final_results(&events);
    assert!(!results.ok);
    assert!(results.bailed_out);
    assert_eq!(results.bailout.as_deref(), Some("database unavailable"));
    assert_eq!(results.plan.map(|p| p.count()), Some(3));
}

#[test]
fn test_garbage_fixture_is_tolerated() {
    let events = tokenize(&read_fixture("garbage.tap"));
    assert_eq!(assertions(&events).len(), 2);

    let extras = events
        .iter()
        .filter(|e| matches!(e, TapEvent::Extra { .. }))
        .count();
    assert_eq!(extras, 6);
    assert!(
        !events
            .iter()
            .any(|e| matches!(e, TapEvent::SubtestStart { .. }))
    );
    assert!(final_results(&events).ok);
}

#[test]
fn test_byte_at_a_time_matches_whole_document() {
    let input = read_fixture("node-tap.tap");
    let whole = tokenize(&input);

    let mut tokenizer = Tokenizer::new();
    for byte in input.as_bytes() {
        tokenizer
            .write(std::slice::from_ref(byte))
            .expect("write should succeed");
    }
    tokenizer.end(None).expect("end should succeed");

    assert_eq!(tokenizer.take_events(), whole);
}

#[test]
fn test_final_chunk_passed_to_end() {
    let mut tokenizer = Tokenizer::new();
    tokenizer.write(b"1..1\n").expect("write");
    tokenizer
        .end(Some(b"ok 1 - last without newline".as_slice()))
        .expect("end");

    let events = tokenizer.take_events();
    assert_eq!(assertions(&events)[0].name, "last without newline");
    assert!(final_results(&events).ok);
}

#[test]
fn test_events_serialize_to_json_tags() {
    let events = tokenize("1..1\nok 1 - a\n");
    let json = serde_json::to_string(&events).expect("serialize");
    assert!(json.contains("\"type\":\"plan\""));
    assert!(json.contains("\"type\":\"assert\""));
    assert!(json.contains("\"type\":\"complete\""));
}

mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_chunking_does_not_change_events(split in 1usize..64) {
            let input = read_fixture("node-tap.tap");
            let whole = tokenize(&input);

            let mut tokenizer = Tokenizer::new();
            for chunk in input.as_bytes().chunks(split) {
                tokenizer.write(chunk).expect("write should succeed");
            }
            tokenizer.end(None).expect("end should succeed");

            prop_assert_eq!(tokenizer.take_events(), whole);
        }

        #[test]
        fn prop_arbitrary_text_always_completes(input in ".{0,400}") {
            let events = tokenize(&input);
            let completes = events
                .iter()
                .filter(|e| matches!(e, TapEvent::Complete(_)))
                .count();
            prop_assert_eq!(completes, 1);
            prop_assert!(matches!(events.last(), Some(TapEvent::Complete(_))));
        }
    }
}
