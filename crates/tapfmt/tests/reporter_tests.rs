// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Reporter tests against fixture streams
//!
//! Execution reports are compared exactly; the human-readable reporters are
//! checked for their key lines only, since they print wall-clock timings.


use std::fs;

use similar_asserts::assert_eq;
use tapfmt::{FormatError, Formatter, ReporterError, ReporterOptions};
use test_utils::{Captured, format, format_with, read_fixture};

const MIXED_GENERIC: &str = r#"<testExecutions version="1">
<testCase name="test/math.js addition" time="0.002"/>
<testCase name="test/math.js addition" time="0.001"/>
<testCase name="test/math.js division" time="0.003"><failure message="divides by zero"><![CDATA[should throw <RangeError>
at Test.<anonymous> (test/math.js:20:7)
]]></failure></testCase>
<testCase name="test/math.js division" time="0"><skipped message="rounds down"><![CDATA[flaky on CI]]></skipped></testCase>
<testCase name="test/string.js" time="0.001"/>
<testCase name="test/string.js" time="0"><skipped message="pads left"><![CDATA[not implemented]]></skipped></testCase>
</testExecutions>
"#;

const MIXED_SONARQUBE: &str = r#"<testExecutions version="1">
<file path="src/test/math.js">
<testCase name="test/math.js addition" time="0.002"/>
<testCase name="test/math.js addition" time="0.001"/>
<testCase name="test/math.js division" time="0.003"><failure message="divides by zero"><![CDATA[should throw <RangeError>
at Test.<anonymous> (test/math.js:20:7)
]]></failure></testCase>
<testCase name="test/math.js division" time="0"><skipped message="rounds down"><![CDATA[flaky on CI]]></skipped></testCase>
</file>
<file path="src/test/string.js">
<testCase name="test/string.js" time="0.001"/>
<testCase name="test/string.js" time="0"><skipped message="pads left"><![CDATA[not implemented]]></skipped></testCase>
</file>
</testExecutions>
"#;

fn prefixed(prefix: &str) -> ReporterOptions {
    ReporterOptions {
        prepend_test_file_name: Some(prefix.to_string()),
        ..Default::default()
    }
}

// ============================================================================
// generic-execution
// ============================================================================

#[test]
fn test_generic_execution_mixed() {
    let (outcome, text) = format("generic-execution", &read_fixture("mixed.tap"));
    assert_eq!(text, MIXED_GENERIC);
    assert!(!outcome.ok);
    assert_eq!(outcome.failures, 1);
}

#[test]
fn test_generic_execution_flat_tests_have_empty_name() {
    let (outcome, text) = format("generic-execution", &read_fixture("passing.tap"));
    assert_eq!(
        text,
        "<testExecutions version=\"1\">\n\
         <testCase name=\"\" time=\"0\"/>\n\
         <testCase name=\"\" time=\"0.005\"/>\n\
         <testCase name=\"\" time=\"0.012\"/>\n\
         </testExecutions>\n"
    );
    assert!(outcome.ok);
}

#[test]
fn test_generic_execution_empty_input() {
    let (outcome, text) = format("generic-execution", "");
    assert_eq!(text, "<testExecutions version=\"1\">\n</testExecutions>\n");
    assert!(outcome.ok);
}

#[test]
fn test_generic_execution_bailout_reports_executed_tests_only() {
    let (outcome, text) = format("generic-execution", &read_fixture("bailout.tap"));
    assert_eq!(text.matches("<testCase").count(), 1);
    assert!(!outcome.ok);
}

// ============================================================================
// sonarqube
// ============================================================================

#[test]
fn test_sonarqube_groups_by_top_level_suite() {
    let (outcome, text) = format_with("sonarqube", &prefixed("src"), &read_fixture("mixed.tap"));
    assert_eq!(text, MIXED_SONARQUBE);
    assert!(!outcome.ok);
}

#[test]
fn test_sonarqube_without_prefix() {
    let (_, text) = format("sonarqube", &read_fixture("mixed.tap"));
    assert!(text.contains("<file path=\"test/math.js\">"));
    assert!(text.contains("<file path=\"test/string.js\">"));
}

#[test]
fn test_sonarqube_flat_stream_uses_root_file() {
    let (_, text) = format("sonarqube", &read_fixture("passing.tap"));
    assert!(text.starts_with("<testExecutions version=\"1\">\n<file path=\"\">\n"));
    assert_eq!(text.matches("<testCase").count(), 3);
    assert!(text.ends_with("</file>\n</testExecutions>\n"));
}

#[test]
fn test_sonarqube_escapes_attributes() {
    let input = "# Subtest: a&b.js\n    1..1\n    ok 1 - x # time=0ms\nok 1 - a&b.js\n1..1\n";
    let (_, text) = format("sonarqube", input);
    assert!(text.contains("<file path=\"a&amp;b.js\">"));
    assert!(text.contains("<testCase name=\"a&amp;b.js\" time=\"0\"/>"));
}

// ============================================================================
// File output
// ============================================================================

#[test]
fn test_file_output_leaves_stdout_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("report.xml");
    let options = ReporterOptions {
        output: Some(path.clone()),
        ..Default::default()
    };
    let (outcome, stdout) = format_with("generic-execution", &options, &read_fixture("mixed.tap"));
    assert_eq!(stdout, "");
    assert_eq!(fs::read_to_string(&path).expect("report file"), MIXED_GENERIC);
    assert!(!outcome.ok);
}

#[test]
fn test_sonarqube_file_output_with_prefix() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("sonar.xml");
    let options = ReporterOptions {
        output: Some(path.clone()),
        prepend_test_file_name: Some("src".into()),
    };
    format_with("sonarqube", &options, &read_fixture("mixed.tap"));
    assert_eq!(fs::read_to_string(&path).expect("report file"), MIXED_SONARQUBE);
}

#[test]
fn test_unwritable_output_is_fatal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let options = ReporterOptions {
        output: Some(dir.path().join("missing").join("report.xml")),
        ..Default::default()
    };
    let result = Formatter::new("sonarqube", &options, Captured::default().boxed());
    assert!(matches!(
        result,
        Err(FormatError::Reporter(ReporterError::Unwritable { .. }))
    ));
}

#[test]
fn test_finish_twice_writes_once() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("report.xml");
    let options = ReporterOptions {
        output: Some(path.clone()),
        ..Default::default()
    };
    let mut formatter =
        Formatter::new("generic-execution", &options, Captured::default().boxed())
            .expect("formatter");
    formatter
        .write(read_fixture("passing.tap").as_bytes())
        .expect("write");
    formatter.end().expect("end");
    let first = formatter.finish().expect("first finish");
    let second = formatter.finish().expect("second finish");
    assert_eq!(first, second);

    let report = fs::read_to_string(&path).expect("report file");
    assert_eq!(report.matches("<testExecutions").count(), 1);
}

// ============================================================================
// Human-readable reporters
// ============================================================================

#[test]
fn test_spec_mixed() {
    let (_, text) = format("spec", &read_fixture("mixed.tap"));
    for line in [
        "  test/math.js\n",
        "    addition\n",
        "      ✓ adds positives\n",
        "    division\n",
        "      1) divides by zero\n",
        "      - rounds down\n",
        "    ✓ concatenates\n",
        "    - pads left\n",
        "  3 passing",
        "  2 pending\n",
        "  1 failing\n",
        "  1) test/math.js division divides by zero:\n     should throw <RangeError>\n",
        "  at Test.<anonymous> (test/math.js:20:7)\n",
    ] {
        assert!(text.contains(line), "missing {line:?} in:\n{text}");
    }
}

#[test]
fn test_dot_mixed() {
    let (_, text) = format("dot", &read_fixture("mixed.tap"));
    assert!(text.starts_with("\n  ..!,.,\n"), "got:\n{text}");
}

#[test]
fn test_silent_renders_nothing() {
    let (outcome, text) = format("silent", &read_fixture("mixed.tap"));
    assert_eq!(text, "");
    assert!(!outcome.ok);
}

#[test]
fn test_json_document() {
    let (_, text) = format("json", &read_fixture("mixed.tap"));
    let doc: serde_json::Value = serde_json::from_str(&text).expect("valid JSON");

    let stats = &doc["stats"];
    let count = |key: &str| stats[key].as_u64();
    assert_eq!(count("suites"), Some(4));
    assert_eq!(count("tests"), Some(6));
    assert_eq!(count("passes"), Some(3));
    assert_eq!(count("pending"), Some(2));
    assert_eq!(count("failures"), Some(1));
    assert!(stats["start"].is_string());

    let failure = &doc["failures"][0];
    assert_eq!(failure["title"].as_str(), Some("divides by zero"));
    assert_eq!(
        failure["fullTitle"].as_str(),
        Some("test/math.js division divides by zero")
    );
    assert_eq!(failure["duration"].as_u64(), Some(3));
    assert_eq!(
        failure["err"]["message"].as_str(),
        Some("should throw <RangeError>")
    );

    assert_eq!(doc["passes"][0]["err"], serde_json::json!({}));
    assert_eq!(doc["tests"].as_array().map(Vec::len), Some(6));
}
