// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! tapfmt library
//!
//! This module exports the reporters, formatter, configuration and driver of
//! the `tapfmt` binary for use in integration tests and as a library.

pub mod config;
pub mod driver;
pub mod formatter;
pub mod reporters;

pub use formatter::{FormatError, Formatter, RunOutcome};
pub use reporters::{Reporter, ReporterError, ReporterKind, ReporterOptions};
