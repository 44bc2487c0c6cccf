// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for tapfmt-parser

use thiserror::Error;

/// Errors that can occur while feeding the tokenizer
///
/// Malformed TAP is never an error: unparseable lines surface as
/// [`TapEvent::Extra`](crate::TapEvent::Extra). Only misuse of the stream
/// lifecycle is reported here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Input was written after the stream was ended
    #[error("write after end: the TAP stream has already been ended")]
    Ended,
}
