// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! tapfmt-runner: TAP test-tree model and run aggregation
//!
//! This library crate consumes the primitive events of `tapfmt-parser` and
//! maintains a tree of suites and tests, the aggregate pass/fail/pending
//! counters and the final verdict. Reporters subscribe to semantic events
//! (`suite`, `pass`, `fail`, `pending`, `suite end`, `end`) on a [`Runner`].

#![warn(missing_docs)]

//! # Example
//!
//! ```no_run
//! use tapfmt_runner::{EventKind, Runner};
//!
//! let mut runner = Runner::new();
//! runner.on(EventKind::Fail, |view, event| {
//!     if let Some(id) = event.test() {
//!         println!("failed: {}", view.tree.test(id).title());
//!     }
//! });
//! runner.write(b"1..1\nnot ok 1 - broken\n").unwrap();
//! runner.end(None).unwrap();
//! assert_eq!(runner.state().ok(), Some(false));
//! ```

pub mod error;
pub mod observer;
pub mod runner;
pub mod state;
pub mod tree;

pub use error::{RunnerError, StateError, TreeError};
pub use observer::{EventKind, Listener, Observers, RunEvent, RunView};
pub use runner::{DEFAULT_FAILURE_MESSAGE, Runner};
pub use state::RunState;
pub use tree::{Outcome, Suite, SuiteId, TestCase, TestError, TestId, TestStatus, TestTree};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::RunnerError;
    pub use crate::observer::{EventKind, RunEvent, RunView};
    pub use crate::runner::Runner;
    pub use crate::state::RunState;
    pub use crate::tree::{Suite, SuiteId, TestCase, TestId, TestStatus, TestTree};
}
