// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! mocha-style JSON report
//!
//! One document written on `end`: run statistics plus the tests, split into
//! `pending`, `failures` and `passes`.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tapfmt_runner::{EventKind, Runner, TestId, TestStatus, TestTree};
use tracing::warn;

use super::base::test_full_title;
use super::output::{Output, SharedOutput};
use super::{Reporter, ReporterError, ReporterOptions};

/// Run statistics
#[derive(Debug, Clone, Serialize)]
pub struct JsonStats {
    /// Suites entered, root excluded
    pub suites: usize,
    /// Settled tests
    pub tests: usize,
    /// Passing tests
    pub passes: usize,
    /// Skipped or todo tests
    pub pending: usize,
    /// Failing tests
    pub failures: usize,
    /// When the first event arrived
    pub start: DateTime<Utc>,
    /// When the run ended
    pub end: DateTime<Utc>,
    /// Milliseconds between `start` and `end`
    pub duration: i64,
}

/// Failure payload; empty for tests that did not fail
#[derive(Debug, Clone, Default, Serialize)]
pub struct JsonError {
    /// Failure message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Stack trace
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

/// One test entry
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonTest {
    /// Test title
    pub title: String,
    /// Suite path and title
    pub full_title: String,
    /// Duration in milliseconds
    pub duration: u64,
    /// Failure payload
    pub err: JsonError,
}

impl JsonTest {
    fn new(tree: &TestTree, id: TestId) -> Self {
        let test = tree.test(id);
        Self {
            title: test.title().to_string(),
            full_title: test_full_title(tree, id),
            duration: test.duration_ms(),
            err: test
                .err()
                .map(|err| JsonError {
                    message: Some(err.message.clone()),
                    stack: err.stack.clone(),
                })
                .unwrap_or_default(),
        }
    }
}

/// The whole document
#[derive(Debug, Clone, Serialize)]
pub struct JsonReport {
    /// Run statistics
    pub stats: JsonStats,
    /// Every test in stream order
    pub tests: Vec<JsonTest>,
    /// Skipped or todo tests
    pub pending: Vec<JsonTest>,
    /// Failing tests
    pub failures: Vec<JsonTest>,
    /// Passing tests
    pub passes: Vec<JsonTest>,
}

#[derive(Debug, Default)]
struct Progress {
    start: Option<DateTime<Utc>>,
    suites: usize,
}

/// Writes a single JSON document on `end`
pub struct JsonReporter {
    output: SharedOutput,
}

impl JsonReporter {
    /// Subscribe to `runner`, writing to the configured file or `stdout`
    ///
    /// # Errors
    ///
    /// Returns [`ReporterError::Unwritable`] if the output file cannot be
    /// opened.
    pub fn new(
        runner: &mut Runner,
        options: &ReporterOptions,
        stdout: Box<dyn Write>,
    ) -> Result<Self, ReporterError> {
        let output = Output::shared(options.output.as_deref(), stdout)?;
        let progress = Rc::new(RefCell::new(Progress::default()));

        let seen = Rc::clone(&progress);
        runner.on(EventKind::Suite, move |view, event| {
            let mut progress = seen.borrow_mut();
            progress.start.get_or_insert_with(Utc::now);
            if event.suite().is_some_and(|id| !view.tree.suite(id).is_root()) {
                progress.suites += 1;
            }
        });

        let sink = Rc::clone(&output);
        runner.on(EventKind::End, move |view, _| {
            let end = Utc::now();
            let progress = progress.borrow();
            let start = progress.start.unwrap_or(end);
            let tree = view.tree;

            let entries = |status: Option<TestStatus>| -> Vec<JsonTest> {
                tree.tests()
                    .filter(|test| status.is_none() || test.state() == status)
                    .map(|test| JsonTest::new(tree, test.id()))
                    .collect()
            };

            let report = JsonReport {
                stats: JsonStats {
                    suites: progress.suites,
                    tests: view.state.total(),
                    passes: view.state.passed(),
                    pending: view.state.pending(),
                    failures: view.state.failed(),
                    start,
                    end,
                    duration: (end - start).num_milliseconds(),
                },
                tests: entries(None),
                pending: entries(Some(TestStatus::Pending)),
                failures: entries(Some(TestStatus::Failed)),
                passes: entries(Some(TestStatus::Passed)),
            };

            match serde_json::to_string_pretty(&report) {
                Ok(json) => sink.borrow_mut().write_line(&json),
                Err(err) => warn!(error = %err, "failed to serialize JSON report"),
            }
        });

        Ok(Self { output })
    }
}

impl Reporter for JsonReporter {
    fn output(&self) -> &SharedOutput {
        &self.output
    }
}
