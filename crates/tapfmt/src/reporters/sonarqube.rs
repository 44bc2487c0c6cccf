// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! SonarQube generic test execution report, grouped by file
//!
//! Each suite directly under the root becomes a `<file>` element whose path is
//! the suite title, optionally prefixed. Tests sitting directly under the root
//! are grouped under a file with the root's empty title.

use std::cell::RefCell;
use std::io::Write;
use std::path::Path;
use std::rc::Rc;

use tapfmt_runner::{EventKind, Runner, SuiteId, TestId};

use super::generic_execution::{CLOSE_EXECUTIONS, open_executions, test_case};
use super::output::{Output, SharedOutput};
use super::tag::tag;
use super::{Reporter, ReporterError, ReporterOptions};

#[derive(Debug)]
struct FileGroup {
    suite: SuiteId,
    tests: Vec<TestId>,
}

#[derive(Debug, Default)]
struct Files {
    groups: Vec<FileGroup>,
}

impl Files {
    fn group(&mut self, suite: SuiteId) -> &mut FileGroup {
        let index = match self.groups.iter().position(|g| g.suite == suite) {
            Some(index) => index,
            None => {
                self.groups.push(FileGroup {
                    suite,
                    tests: Vec::new(),
                });
                self.groups.len() - 1
            }
        };
        &mut self.groups[index]
    }
}

/// Join the configured prefix before a file path
fn file_path(prefix: Option<&str>, title: &str) -> String {
    match prefix {
        Some(prefix) if title.is_empty() => prefix.to_string(),
        Some(prefix) => Path::new(prefix).join(title).to_string_lossy().into_owned(),
        None => title.to_string(),
    }
}

/// Groups tests by top-level suite and writes the report on `end`
pub struct SonarqubeReporter {
    output: SharedOutput,
}

impl SonarqubeReporter {
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
        let files = Rc::new(RefCell::new(Files::default()));

        let opened = Rc::clone(&files);
        runner.on(EventKind::Suite, move |view, event| {
            if let Some(id) = event.suite() {
                if view.tree.depth(id) == 1 {
                    opened.borrow_mut().group(id);
                }
            }
        });

        for kind in [EventKind::Pending, EventKind::Pass, EventKind::Fail] {
            let files = Rc::clone(&files);
            runner.on(kind, move |view, event| {
                let Some(id) = event.test() else {
                    return;
                };
                let parent = view.tree.test(id).parent();
                let file = view
                    .tree
                    .top_level_suite(parent)
                    .unwrap_or_else(|| view.tree.root_id());
                files.borrow_mut().group(file).tests.push(id);
            });
        }

        let sink = Rc::clone(&output);
        let prefix = options.prepend_test_file_name.clone();
        runner.on(EventKind::End, move |view, _| {
            let mut out = sink.borrow_mut();
            out.write_line(&open_executions());
            for group in &files.borrow().groups {
                let title = view.tree.suite(group.suite).title();
                let path = file_path(prefix.as_deref(), title);
                out.write_line(&tag("file", &[("path", path.as_str())], false, None));
                for id in &group.tests {
                    out.write_line(&test_case(view.tree, *id));
                }
                out.write_line("</file>");
            }
            out.write_line(CLOSE_EXECUTIONS);
        });

        Ok(Self { output })
    }
}

impl Reporter for SonarqubeReporter {
    fn output(&self) -> &SharedOutput {
        &self.output
    }
}
