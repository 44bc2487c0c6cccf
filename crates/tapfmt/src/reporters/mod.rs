// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Reporters: renderers driven by runner lifecycle events
//!
//! The catalog is closed: [`ReporterKind`] lists every reporter and
//! [`ReporterKind::build`] wires one to a [`Runner`]. Each reporter owns an
//! [`Output`] and subscribes to the events it needs at construction.

use std::io::{self, Write};
use std::path::PathBuf;

use tapfmt_runner::Runner;
use thiserror::Error;

mod base;
pub mod dot;
pub mod generic_execution;
pub mod json;
pub mod output;
pub mod silent;
pub mod sonarqube;
pub mod spec;
pub mod tag;

pub use dot::DotReporter;
pub use generic_execution::GenericExecutionReporter;
pub use json::JsonReporter;
pub use output::{Output, SharedOutput};
pub use silent::SilentReporter;
pub use sonarqube::SonarqubeReporter;
pub use spec::SpecReporter;

// ============================================================================
// Error Types
// ============================================================================

/// Reporter errors
#[derive(Debug, Error)]
pub enum ReporterError {
    /// The report file could not be opened
    #[error("Cannot write report to {}: {source}", .path.display())]
    Unwritable {
        /// Requested output path
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// Writing or flushing the report failed
    #[error("Report output failed: {0}")]
    Io(#[from] io::Error),

    /// The reporter cannot render this run
    #[error("Cannot render report: {0}")]
    Render(String),
}

// ============================================================================
// Options
// ============================================================================

/// Options shared by all reporters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReporterOptions {
    /// Write the report here instead of stdout
    pub output: Option<PathBuf>,
    /// Path segment joined before each reported file path
    pub prepend_test_file_name: Option<String>,
}

// ============================================================================
// Reporter capability
// ============================================================================

/// A renderer subscribed to a runner
pub trait Reporter {
    /// The sink this reporter renders into
    fn output(&self) -> &SharedOutput;

    /// Finish output, then invoke `callback(failures)`
    ///
    /// The callback runs at most once; a second call does nothing.
    ///
    /// # Errors
    ///
    /// Returns the first write or flush error of the output.
    fn done(
        &mut self,
        failures: usize,
        callback: Box<dyn FnOnce(usize) + '_>,
    ) -> Result<(), ReporterError> {
        if self.output().borrow_mut().close()? {
            callback(failures);
        }
        Ok(())
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Every available reporter, by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReporterKind {
    /// One character per test
    Dot,
    /// SonarQube generic test execution report, flat
    GenericExecution,
    /// mocha-style JSON document
    Json,
    /// No output
    Silent,
    /// SonarQube generic test execution report, grouped by file
    Sonarqube,
    /// Indented tree
    Spec,
    /// Raw TAP passthrough
    Tap,
}

/// Column at which the catalog listing wraps
const CATALOG_WIDTH: usize = 40;

impl ReporterKind {
    /// All reporters, sorted by name
    pub const ALL: [ReporterKind; 7] = [
        Self::Dot,
        Self::GenericExecution,
        Self::Json,
        Self::Silent,
        Self::Sonarqube,
        Self::Spec,
        Self::Tap,
    ];

    /// Catalog name
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Dot => "dot",
            Self::GenericExecution => "generic-execution",
            Self::Json => "json",
            Self::Silent => "silent",
            Self::Sonarqube => "sonarqube",
            Self::Spec => "spec",
            Self::Tap => "tap",
        }
    }

    /// Look up a reporter by catalog name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Whether input is echoed instead of rendered
    #[must_use]
    pub fn is_passthrough(&self) -> bool {
        matches!(self, Self::Tap)
    }

    /// Construct the reporter and subscribe it to `runner`
    ///
    /// # Errors
    ///
    /// Returns [`ReporterError::Unwritable`] if the output file cannot be
    /// opened, or [`ReporterError::Render`] for the passthrough kind, which
    /// has no reporter.
    pub fn build(
        &self,
        runner: &mut Runner,
        options: &ReporterOptions,
        stdout: Box<dyn Write>,
    ) -> Result<Box<dyn Reporter>, ReporterError> {
        Ok(match self {
            Self::Dot => Box::new(DotReporter::new(runner, options, stdout)?),
            Self::GenericExecution => {
                Box::new(GenericExecutionReporter::new(runner, options, stdout)?)
            }
            Self::Json => Box::new(JsonReporter::new(runner, options, stdout)?),
            Self::Silent => Box::new(SilentReporter::new(runner, options, stdout)),
            Self::Sonarqube => Box::new(SonarqubeReporter::new(runner, options, stdout)?),
            Self::Spec => Box::new(SpecReporter::new(runner, options, stdout)?),
            Self::Tap => {
                return Err(ReporterError::Render(
                    "tap input is passed through, not rendered".into(),
                ));
            }
        })
    }

    /// Human-readable catalog listing, wrapped near 40 columns
    #[must_use]
    pub fn available() -> String {
        let mut listing = String::new();
        for kind in Self::ALL {
            let name = kind.name();
            let line_len = listing.rsplit('\n').next().map_or(0, str::len);
            if line_len + name.len() < CATALOG_WIDTH {
                listing.push(' ');
            } else {
                listing.push('\n');
            }
            listing.push_str(name);
        }
        format!("Available format types:\n\n{}", listing.trim())
    }
}

impl std::fmt::Display for ReporterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
