// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! One character per test: `.` pass, `!` fail, `,` pending

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use std::time::Instant;

use tapfmt_runner::{EventKind, Runner, RunEvent};

use super::base::epilogue;
use super::output::{Output, SharedOutput};
use super::{Reporter, ReporterError, ReporterOptions};

/// Dots per line before wrapping
const LINE_WIDTH: usize = 72;

#[derive(Debug)]
struct Progress {
    started: Instant,
    column: usize,
}

/// Prints a dot per test, then the summary
pub struct DotReporter {
    output: SharedOutput,
}

impl DotReporter {
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
            column: 0,
        }));

        for kind in [EventKind::Pass, EventKind::Fail, EventKind::Pending] {
            let sink = Rc::clone(&output);
            let progress = Rc::clone(&progress);
            runner.on(kind, move |_, event| {
                let mark = match event {
                    RunEvent::Pass(_) => ".",
                    RunEvent::Fail(_) => "!",
                    _ => ",",
                };
                let mut progress = progress.borrow_mut();
                let mut out = sink.borrow_mut();
                if progress.column % LINE_WIDTH == 0 {
                    out.write_str("\n  ");
                }
                progress.column += 1;
                out.write_str(mark);
            });
        }

        let sink = Rc::clone(&output);
        runner.on(EventKind::End, move |view, _| {
            let progress = progress.borrow();
            let mut out = sink.borrow_mut();
            if progress.column > 0 {
                out.write_line("");
            }
            epilogue(&mut out, view, progress.started.elapsed());
        });

        Ok(Self { output })
    }
}

impl Reporter for DotReporter {
    fn output(&self) -> &SharedOutput {
        &self.output
    }
}
