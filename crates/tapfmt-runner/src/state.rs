// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Run aggregate: counters and the final verdict

use serde::Serialize;

use crate::error::StateError;
use crate::tree::TestStatus;

/// Counters and verdict for one run
///
/// `ok` is `None` while the run is in progress and fixed once finalized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunState {
    passed: usize,
    failed: usize,
    pending: usize,
    bailed_out: bool,
    ok: Option<bool>,
}

impl RunState {
    /// Create an empty, unfinalized state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tests that passed
    #[must_use]
    pub fn passed(&self) -> usize {
        self.passed
    }

    /// Tests that failed
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Tests that were skipped or todo
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Total settled tests
    #[must_use]
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.pending
    }

    /// Whether the stream bailed out
    #[must_use]
    pub fn bailed_out(&self) -> bool {
        self.bailed_out
    }

    /// Final verdict, `None` until the run completes
    #[must_use]
    pub fn ok(&self) -> Option<bool> {
        self.ok
    }

    /// Whether the verdict has been computed
    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.ok.is_some()
    }

    pub(crate) fn record(&mut self, status: TestStatus) -> Result<(), StateError> {
        if self.is_finalized() {
            return Err(StateError::AlreadyFinalized);
        }
        match status {
            TestStatus::Passed => self.passed += 1,
            TestStatus::Failed => self.failed += 1,
            TestStatus::Pending => self.pending += 1,
        }
        Ok(())
    }

    pub(crate) fn mark_bailout(&mut self) {
        self.bailed_out = true;
    }

    /// Fix the verdict: the stream's own verdict, no failures, no bailout
    pub(crate) fn finalize(&mut self, stream_ok: bool) -> Result<bool, StateError> {
        if self.is_finalized() {
            return Err(StateError::AlreadyFinalized);
        }
        let ok = stream_ok && self.failed == 0 && !self.bailed_out;
        self.ok = Some(ok);
        Ok(ok)
    }
}
