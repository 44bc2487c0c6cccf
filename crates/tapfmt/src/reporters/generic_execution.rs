// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! SonarQube generic test execution report, flat
//!
//! ```xml
//! <testExecutions version="1">
//! <testCase name="suite path" time="0.004"/>
//! <testCase name="suite path" time="0"><failure message="title"><![CDATA[message
//! stack]]></failure></testCase>
//! </testExecutions>
//! ```

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use tapfmt_runner::{EventKind, Outcome, Runner, TestId, TestTree};

use super::output::{Output, SharedOutput};
use super::tag::{cdata, tag};
use super::{Reporter, ReporterError, ReporterOptions};

/// Report format version written on the root element
pub const EXECUTIONS_VERSION: &str = "1";

/// Element name for a single test
pub const TEST_CASE: &str = "testCase";

/// Opening root element
pub(crate) fn open_executions() -> String {
    tag("testExecutions", &[("version", EXECUTIONS_VERSION)], false, None)
}

/// Closing root element
pub(crate) const CLOSE_EXECUTIONS: &str = "</testExecutions>";

/// Render one `<testCase>` element
///
/// `name` is the test's suite path and `time` its duration in seconds.
pub(crate) fn test_case(tree: &TestTree, id: TestId) -> String {
    let test = tree.test(id);
    let name = tree.full_title(id);
    let time = test.duration_secs().to_string();
    let attrs = [("name", name.as_str()), ("time", time.as_str())];

    match test.outcome() {
        Some(Outcome::Failed(err)) => {
            let body = cdata(&format!("{}\n{}", err.message, err.stack_or_empty()));
            let failure = tag("failure", &[("message", test.title())], false, Some(&body));
            tag(TEST_CASE, &attrs, false, Some(&failure))
        }
        Some(Outcome::Pending { reason, .. }) => {
            let body = cdata(reason.as_deref().unwrap_or(""));
            let skipped = tag("skipped", &[("message", test.title())], false, Some(&body));
            tag(TEST_CASE, &attrs, false, Some(&skipped))
        }
        _ => tag(TEST_CASE, &attrs, true, None),
    }
}

/// Collects every settled test and writes the report on `end`
pub struct GenericExecutionReporter {
    output: SharedOutput,
}

impl GenericExecutionReporter {
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
        let tests: Rc<RefCell<Vec<TestId>>> = Rc::new(RefCell::new(Vec::new()));

        for kind in [EventKind::Pending, EventKind::Pass, EventKind::Fail] {
            let tests = Rc::clone(&tests);
            runner.on(kind, move |_, event| {
                if let Some(id) = event.test() {
                    tests.borrow_mut().push(id);
                }
            });
        }

        let sink = Rc::clone(&output);
        runner.on(EventKind::End, move |view, _| {
            let mut out = sink.borrow_mut();
            out.write_line(&open_executions());
            for id in tests.borrow().iter() {
                out.write_line(&test_case(view.tree, *id));
            }
            out.write_line(CLOSE_EXECUTIONS);
        });

        Ok(Self { output })
    }
}

impl Reporter for GenericExecutionReporter {
    fn output(&self) -> &SharedOutput {
        &self.output
    }
}
