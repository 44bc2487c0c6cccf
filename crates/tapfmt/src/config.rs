// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Configuration for the tapfmt command line
//!
//! This module provides the clap-derived [`Config`], the mapping from
//! verbosity flags to a log level, and the options handed to reporters.

use std::path::PathBuf;

use clap::{CommandFactory, Parser};

use crate::reporters::{ReporterKind, ReporterOptions};

/// tapfmt - format TAP test output with pluggable reporters
///
/// Reads TAP data on stdin and formats it using the specified reporter.
/// Some reporters can write to a file instead of stdout.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "tapfmt")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Reporter to format with
    ///
    /// Omit to print usage and the available reporters.
    #[arg(value_name = "REPORTER")]
    pub reporter: Option<String>,

    /// Write the report to this file instead of stdout
    #[arg(short, long, value_name = "FILE", env = "TAPFMT_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Path prepended to each file path in the report
    #[arg(
        short,
        long = "prependTestFileName",
        visible_alias = "prepend-test-file-name",
        value_name = "PATH"
    )]
    pub prepend_test_file_name: Option<String>,

    /// Enable verbose logging (debug level)
    ///
    /// Logs are written to stderr so they never mix with report output.
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,

    /// Quiet mode - suppress info-level logs
    ///
    /// Only errors and warnings will be logged.
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,
}

impl Config {
    /// Options passed to the reporter
    #[must_use]
    pub fn reporter_options(&self) -> ReporterOptions {
        ReporterOptions {
            output: self.output.clone(),
            prepend_test_file_name: self
                .prepend_test_file_name
                .clone()
                .filter(|prefix| !prefix.is_empty()),
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the output file's parent directory does not exist.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ref output) = self.output {
            if output.as_os_str().is_empty() {
                return Err(ConfigError::EmptyOutputPath);
            }
            if let Some(parent) = output.parent() {
                if !parent.as_os_str().is_empty() && !parent.is_dir() {
                    return Err(ConfigError::OutputDirectoryNotFound(parent.to_path_buf()));
                }
            }
        }
        Ok(())
    }

    /// Get the log level based on verbose/quiet flags
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }
}

/// Usage text followed by the reporter catalog
#[must_use]
pub fn usage() -> String {
    format!(
        "{}\n\nReads TAP data on stdin, and formats to stdout using the specified\n\
         reporter. (Note that some reporters write to files instead of stdout.)\n\n{}",
        Config::command().render_usage(),
        ReporterKind::available()
    )
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Output path was given but empty
    #[error("Output path must not be empty")]
    EmptyOutputPath,

    /// Output file's directory does not exist
    #[error("Output directory not found: {0}")]
    OutputDirectoryNotFound(PathBuf),
}
