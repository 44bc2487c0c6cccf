// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Formatter: one runner wired to one reporter
//!
//! The `tap` kind skips the runner entirely: input is echoed to stdout and
//! only tokenized to compute the exit status.

use std::io::{self, Write};

use tapfmt_parser::{ParseError, Tokenizer};
use tapfmt_runner::{Runner, RunnerError};
use thiserror::Error;
use tracing::{debug, warn};

use crate::reporters::{Reporter, ReporterError, ReporterKind, ReporterOptions};

/// Formatter errors
#[derive(Debug, Error)]
pub enum FormatError {
    /// Runner misuse or tree corruption
    #[error("Runner error: {0}")]
    Runner(#[from] RunnerError),

    /// Tokenizer misuse in passthrough mode
    #[error("Tokenizer error: {0}")]
    Parse(#[from] ParseError),

    /// Reporter construction or output failure
    #[error(transparent)]
    Reporter(#[from] ReporterError),

    /// Passthrough write to stdout failed
    #[error("Failed to write to stdout: {0}")]
    Io(#[from] io::Error),

    /// `finish` before the stream completed
    #[error("Input has not been ended")]
    Incomplete,
}

/// Result of a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    /// Overall verdict; `false` maps to exit status 1
    pub ok: bool,
    /// Number of failed tests
    pub failures: usize,
}

impl RunOutcome {
    /// Process exit status for this outcome
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        u8::from(!self.ok)
    }
}

enum Mode {
    Passthrough {
        tokenizer: Tokenizer,
        stdout: Box<dyn Write>,
    },
    Report {
        runner: Runner,
        reporter: Box<dyn Reporter>,
    },
}

/// Writable front end for a TAP stream
pub struct Formatter {
    kind: ReporterKind,
    mode: Mode,
}

impl Formatter {
    /// Create a formatter for the reporter called `name`
    ///
    /// An unknown name logs a warning, prints the catalog to stderr and falls
    /// back to the silent reporter; the exit status is still computed.
    ///
    /// # Errors
    ///
    /// Returns an error if the reporter's output file cannot be opened.
    pub fn new(
        name: &str,
        options: &ReporterOptions,
        stdout: Box<dyn Write>,
    ) -> Result<Self, FormatError> {
        let kind = ReporterKind::from_name(name).unwrap_or_else(|| {
            warn!(reporter = name, "unknown format type, using silent");
            eprintln!(
                "Unknown format type: {name}\n\n{}",
                ReporterKind::available()
            );
            ReporterKind::Silent
        });
        Self::with_kind(kind, options, stdout)
    }

    /// Create a formatter for a known reporter
    ///
    /// # Errors
    ///
    /// Returns an error if the reporter's output file cannot be opened.
    pub fn with_kind(
        kind: ReporterKind,
        options: &ReporterOptions,
        stdout: Box<dyn Write>,
    ) -> Result<Self, FormatError> {
        debug!(reporter = %kind, "creating formatter");
        let mode = if kind.is_passthrough() {
            Mode::Passthrough {
                tokenizer: Tokenizer::new(),
                stdout,
            }
        } else {
            let mut runner = Runner::new();
            let reporter = kind.build(&mut runner, options, stdout)?;
            Mode::Report { runner, reporter }
        };
        Ok(Self { kind, mode })
    }

    /// The reporter in use
    #[must_use]
    pub fn kind(&self) -> ReporterKind {
        self.kind
    }

    /// Feed a chunk of TAP bytes
    ///
    /// Returns `false` when the caller should yield before writing more.
    ///
    /// # Errors
    ///
    /// Returns an error after [`Formatter::end`], or if passthrough output
    /// fails.
    pub fn write(&mut self, chunk: &[u8]) -> Result<bool, FormatError> {
        match &mut self.mode {
            Mode::Passthrough { tokenizer, stdout } => {
                stdout.write_all(chunk)?;
                Ok(tokenizer.write(chunk)?)
            }
            Mode::Report { runner, .. } => Ok(runner.write(chunk)?),
        }
    }

    /// Signal end of input
    ///
    /// # Errors
    ///
    /// Returns an error when called twice.
    pub fn end(&mut self) -> Result<(), FormatError> {
        match &mut self.mode {
            Mode::Passthrough { tokenizer, stdout } => {
                tokenizer.end(None)?;
                stdout.flush()?;
            }
            Mode::Report { runner, .. } => runner.end(None)?,
        }
        Ok(())
    }

    /// Let the reporter finish and return the run's outcome
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::Incomplete`] before [`Formatter::end`], or the
    /// reporter's output error.
    pub fn finish(&mut self) -> Result<RunOutcome, FormatError> {
        match &mut self.mode {
            Mode::Passthrough { tokenizer, .. } => {
                let results = tokenizer.final_results().ok_or(FormatError::Incomplete)?;
                Ok(RunOutcome {
                    ok: results.ok,
                    failures: results.fail,
                })
            }
            Mode::Report { runner, reporter } => {
                let ok = runner.state().ok().ok_or(FormatError::Incomplete)?;
                let failures = runner.state().failed();
                reporter.done(
                    failures,
                    Box::new(|failures| debug!(failures, "reporter done")),
                )?;
                Ok(RunOutcome { ok, failures })
            }
        }
    }
}

impl std::fmt::Debug for Formatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Formatter").field("kind", &self.kind).finish()
    }
}
