// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Indented, human-readable tree of suites and tests

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use std::time::Instant;

use tapfmt_runner::{EventKind, Runner, RunEvent};

use super::base::{epilogue, indent};
use super::output::{Output, SharedOutput};
use super::{Reporter, ReporterError, ReporterOptions};

/// Tests slower than this get their duration printed
const SLOW_MS: u64 = 75;

#[derive(Debug)]
struct Progress {
    started: Instant,
    failures: usize,
}

/// Prints each suite title and one line per test as it settles
pub struct SpecReporter {
    output: SharedOutput,
}

impl SpecReporter {
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
        let progress = Rc::new(RefCell::new(Progress {
            started: Instant::now(),
            failures: 0,
        }));

        let sink = Rc::clone(&output);
        let started = Rc::clone(&progress);
        runner.on(EventKind::Suite, move |view, event| {
            let Some(id) = event.suite() else {
                return;
            };
            let suite = view.tree.suite(id);
            if suite.is_root() {
                started.borrow_mut().started = Instant::now();
                return;
            }
            let depth = view.tree.depth(id);
            let mut out = sink.borrow_mut();
            if depth == 1 {
                out.write_line("");
            }
            out.write_line(&format!("{}{}", indent(depth), suite.title()));
        });

        for kind in [EventKind::Pass, EventKind::Fail, EventKind::Pending] {
            let sink = Rc::clone(&output);
            let progress = Rc::clone(&progress);
            runner.on(kind, move |view, event| {
                let Some(id) = event.test() else {
                    return;
                };
                let test = view.tree.test(id);
                let pad = indent(view.tree.depth(test.parent()) + 1);
                let line = match event {
                    RunEvent::Pass(_) if test.duration_ms() > SLOW_MS => {
                        format!("{pad}✓ {} ({}ms)", test.title(), test.duration_ms())
                    }
                    RunEvent::Pass(_) => format!("{pad}✓ {}", test.title()),
                    RunEvent::Fail(_) => {
                        let mut progress = progress.borrow_mut();
                        progress.failures += 1;
                        format!("{pad}{}) {}", progress.failures, test.title())
                    }
                    _ => format!("{pad}- {}", test.title()),
                };
                sink.borrow_mut().write_line(&line);
            });
        }

        let sink = Rc::clone(&output);
        runner.on(EventKind::End, move |view, _| {
            let elapsed = progress.borrow().started.elapsed();
            epilogue(&mut sink.borrow_mut(), view, elapsed);
        });

        Ok(Self { output })
    }
}

impl Reporter for SpecReporter {
    fn output(&self) -> &SharedOutput {
        &self.output
    }
}
