// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Reporter that renders nothing

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use tapfmt_runner::Runner;

use super::output::{Output, SharedOutput};
use super::{Reporter, ReporterOptions};

/// Subscribes to nothing; the run still produces an exit status
pub struct SilentReporter {
    output: SharedOutput,
}

impl SilentReporter {
    /// Create the reporter; the output file option is ignored
    #[must_use]
    pub fn new(_runner: &mut Runner, _options: &ReporterOptions, stdout: Box<dyn Write>) -> Self {
        Self {
            output: Rc::new(RefCell::new(Output::stream(stdout))),
        }
    }
}

impl Reporter for SilentReporter {
    fn output(&self) -> &SharedOutput {
        &self.output
    }
}
