// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! tapfmt-parser: TAP tokenizer for tapfmt
//!
//! This library crate turns a stream of TAP (Test Anything Protocol) bytes
//! into primitive events: plans, assertions, comments, subtest boundaries,
//! bailouts and a final completion event carrying the aggregate verdict.
//!
//! # Example
//!
//! ```no_run
//! use tapfmt_parser::{TapEvent, Tokenizer, tokenize};
//!
//! // Tokenize a complete document
//! let events = tokenize("1..1\nok 1 - works\n");
//!
//! // Or feed bytes incrementally
//! let mut tokenizer = Tokenizer::new();
//! tokenizer.write(b"1..1\n").unwrap();
//! tokenizer.write(b"ok 1 - works\n").unwrap();
//! tokenizer.end(None).unwrap();
//! for event in tokenizer.take_events() {
//!     if let TapEvent::Assert(assertion) = event {
//!         println!("{} {}", assertion.ok, assertion.name);
//!     }
//! }
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod event;
pub mod line;
pub mod tokenizer;

pub use error::ParseError;
pub use event::{
    Assertion, Diagnostics, Directive, DirectiveKind, FinalResults, Plan, TapEvent,
};
pub use line::{Line, parse_line};
pub use tokenizer::{HIGH_WATER_MARK, Tokenizer, tokenize};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::ParseError;
    pub use crate::event::{Assertion, FinalResults, TapEvent};
    pub use crate::tokenizer::{Tokenizer, tokenize};
}
