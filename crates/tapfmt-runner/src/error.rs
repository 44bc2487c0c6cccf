// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for tapfmt-runner

use tapfmt_parser::ParseError;
use thiserror::Error;

/// Errors raised while driving a run
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Error from the tokenizer
    #[error("Tokenizer error: {0}")]
    Parse(#[from] ParseError),

    /// `write` or `end` called after the input stream was ended
    #[error("Input stream already ended")]
    StreamEnded,

    /// A suite end arrived with no open suite below the root
    #[error("Suite end without a matching suite start")]
    UnbalancedSuiteEnd,

    /// A primitive event arrived after the run completed or bailed out
    #[error("Event received after the run was closed")]
    EventAfterCompletion,

    /// Error from the test tree
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// Error from the aggregate state
    #[error(transparent)]
    State(#[from] StateError),
}

/// Errors from mutating the test tree
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// A test was settled twice
    #[error("Test already settled: {title}")]
    AlreadySettled {
        /// Title of the offending test
        title: String,
    },
}

/// Errors from the run aggregate
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StateError {
    /// A result was recorded after the verdict was computed
    #[error("Run state already finalized")]
    AlreadyFinalized,
}
