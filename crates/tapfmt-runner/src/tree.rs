// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Test-tree model
//!
//! Suites and test cases live in a [`TestTree`] arena and refer to each other
//! by [`SuiteId`] / [`TestId`]. Parent links are lookups only; the tree owns
//! every node exactly once.

use std::time::Duration;

use serde::Serialize;
use tapfmt_parser::DirectiveKind;

use crate::error::TreeError;

/// Identity of a [`Suite`] within its tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SuiteId(usize);

/// Identity of a [`TestCase`] within its tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TestId(usize);

/// Terminal state of a test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    /// Skipped or todo
    Pending,
    /// Passed
    Passed,
    /// Failed
    Failed,
}

impl TestStatus {
    /// Lowercase name, as used in reports
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Passed => "passed",
            Self::Failed => "failed",
        }
    }
}

/// Failure payload of a failed test
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestError {
    /// Failure message
    pub message: String,
    /// Stack trace, if the producer supplied one
    pub stack: Option<String>,
}

impl TestError {
    /// The stack trace, or an empty string when none was supplied
    #[must_use]
    pub fn stack_or_empty(&self) -> &str {
        self.stack.as_deref().unwrap_or("")
    }
}

/// How a test case settled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Skipped or todo
    Pending {
        /// The directive that made the test pending
        kind: DirectiveKind,
        /// The directive's reason, if any
        reason: Option<String>,
    },
    /// Passed
    Passed,
    /// Failed with an error payload
    Failed(TestError),
}

impl Outcome {
    /// The status this outcome settles to
    #[must_use]
    pub fn status(&self) -> TestStatus {
        match self {
            Self::Pending { .. } => TestStatus::Pending,
            Self::Passed => TestStatus::Passed,
            Self::Failed(_) => TestStatus::Failed,
        }
    }
}

/// A named grouping node
#[derive(Debug, Clone)]
pub struct Suite {
    id: SuiteId,
    title: String,
    root: bool,
    parent: Option<SuiteId>,
    suites: Vec<SuiteId>,
    tests: Vec<TestId>,
    plan: Option<usize>,
}

impl Suite {
    /// Identity of this suite
    #[must_use]
    pub fn id(&self) -> SuiteId {
        self.id
    }

    /// Suite title; empty for the root
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Whether this is the implicit top-level suite
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.root
    }

    /// Owning suite, `None` only for the root
    #[must_use]
    pub fn parent(&self) -> Option<SuiteId> {
        self.parent
    }

    /// Child suites in creation order
    #[must_use]
    pub fn suites(&self) -> &[SuiteId] {
        &self.suites
    }

    /// Owned test cases in creation order
    #[must_use]
    pub fn tests(&self) -> &[TestId] {
        &self.tests
    }

    /// Number of assertions announced by a plan inside this suite
    ///
    /// A suite may close with fewer tests than announced.
    #[must_use]
    pub fn plan(&self) -> Option<usize> {
        self.plan
    }
}

impl PartialEq for Suite {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Suite {}

/// A single assertion result
#[derive(Debug, Clone)]
pub struct TestCase {
    id: TestId,
    title: String,
    parent: SuiteId,
    duration: Duration,
    outcome: Option<Outcome>,
}

impl TestCase {
    /// Identity of this test
    #[must_use]
    pub fn id(&self) -> TestId {
        self.id
    }

    /// Test title
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Owning suite
    #[must_use]
    pub fn parent(&self) -> SuiteId {
        self.parent
    }

    /// Terminal state, `None` until settled
    #[must_use]
    pub fn state(&self) -> Option<TestStatus> {
        self.outcome.as_ref().map(Outcome::status)
    }

    /// Whether the test has reached a terminal state
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.outcome.is_some()
    }

    /// Full outcome, `None` until settled
    #[must_use]
    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// Failure payload; present iff the test failed
    #[must_use]
    pub fn err(&self) -> Option<&TestError> {
        match &self.outcome {
            Some(Outcome::Failed(err)) => Some(err),
            _ => None,
        }
    }

    /// Directive kind of a pending test
    #[must_use]
    pub fn directive(&self) -> Option<DirectiveKind> {
        match &self.outcome {
            Some(Outcome::Pending { kind, .. }) => Some(*kind),
            _ => None,
        }
    }

    /// Directive reason of a pending test
    #[must_use]
    pub fn pending_reason(&self) -> Option<&str> {
        match &self.outcome {
            Some(Outcome::Pending { reason, .. }) => reason.as_deref(),
            _ => None,
        }
    }

    /// Elapsed time, zero if unmeasured
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Elapsed time in whole milliseconds
    #[must_use]
    pub fn duration_ms(&self) -> u64 {
        u64::try_from(self.duration.as_millis()).unwrap_or(u64::MAX)
    }

    /// Elapsed time in seconds (`duration_ms / 1000`), for formatting
    #[must_use]
    pub fn duration_secs(&self) -> f64 {
        self.duration_ms() as f64 / 1000.0
    }
}

impl PartialEq for TestCase {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TestCase {}

/// Arena holding one run's suites and tests
#[derive(Debug, Clone)]
pub struct TestTree {
    suites: Vec<Suite>,
    tests: Vec<TestCase>,
}

impl TestTree {
    /// Create a tree containing only the root suite
    #[must_use]
    pub fn new() -> Self {
        Self {
            suites: vec![Suite {
                id: SuiteId(0),
                title: String::new(),
                root: true,
                parent: None,
                suites: Vec::new(),
                tests: Vec::new(),
                plan: None,
            }],
            tests: Vec::new(),
        }
    }

    /// Identity of the root suite
    #[must_use]
    pub fn root_id(&self) -> SuiteId {
        SuiteId(0)
    }

    /// The root suite
    #[must_use]
    pub fn root(&self) -> &Suite {
        &self.suites[0]
    }

    /// Look up a suite
    ///
    /// # Panics
    ///
    /// Panics if `id` was minted by a different tree.
    #[must_use]
    pub fn suite(&self, id: SuiteId) -> &Suite {
        &self.suites[id.0]
    }

    /// Look up a test case
    ///
    /// # Panics
    ///
    /// Panics if `id` was minted by a different tree.
    #[must_use]
    pub fn test(&self, id: TestId) -> &TestCase {
        &self.tests[id.0]
    }

    /// All suites in creation order, root first
    pub fn suites(&self) -> impl Iterator<Item = &Suite> {
        self.suites.iter()
    }

    /// All test cases in creation (stream) order
    pub fn tests(&self) -> impl Iterator<Item = &TestCase> {
        self.tests.iter()
    }

    /// Number of test cases
    #[must_use]
    pub fn test_count(&self) -> usize {
        self.tests.len()
    }

    /// Test cases owned directly by a suite
    pub fn tests_of(&self, id: SuiteId) -> impl Iterator<Item = &TestCase> {
        self.suite(id).tests.iter().map(|test| self.test(*test))
    }

    /// Child suites of a suite
    pub fn children_of(&self, id: SuiteId) -> impl Iterator<Item = &Suite> {
        self.suite(id).suites.iter().map(|suite| self.suite(*suite))
    }

    /// Walk from `id` up to and including the root
    pub fn ancestors(&self, id: SuiteId) -> impl Iterator<Item = &Suite> {
        std::iter::successors(Some(self.suite(id)), |suite| {
            suite.parent.map(|parent| self.suite(parent))
        })
    }

    /// Nesting depth; the root is 0
    #[must_use]
    pub fn depth(&self, id: SuiteId) -> usize {
        self.ancestors(id).count() - 1
    }

    /// The suite directly under the root that contains `id`
    ///
    /// Returns `None` for the root itself.
    #[must_use]
    pub fn top_level_suite(&self, id: SuiteId) -> Option<SuiteId> {
        self.ancestors(id)
            .take_while(|suite| !suite.root)
            .last()
            .map(Suite::id)
    }

    /// Space-joined titles from the top-level suite down to `id`
    ///
    /// The root and empty titles are skipped; the root's full title is empty.
    #[must_use]
    pub fn suite_full_title(&self, id: SuiteId) -> String {
        let mut titles: Vec<&str> = self
            .ancestors(id)
            .filter(|suite| !suite.root && !suite.title.is_empty())
            .map(|suite| suite.title.as_str())
            .collect();
        titles.reverse();
        titles.join(" ")
    }

    /// Space-joined titles of the suites enclosing a test, root excluded
    #[must_use]
    pub fn full_title(&self, id: TestId) -> String {
        self.suite_full_title(self.test(id).parent)
    }

    pub(crate) fn add_suite(&mut self, parent: SuiteId, title: String) -> SuiteId {
        let id = SuiteId(self.suites.len());
        self.suites.push(Suite {
            id,
            title,
            root: false,
            parent: Some(parent),
            suites: Vec::new(),
            tests: Vec::new(),
            plan: None,
        });
        self.suites[parent.0].suites.push(id);
        id
    }

    pub(crate) fn add_test(&mut self, parent: SuiteId, title: String) -> TestId {
        let id = TestId(self.tests.len());
        self.tests.push(TestCase {
            id,
            title,
            parent,
            duration: Duration::ZERO,
            outcome: None,
        });
        self.suites[parent.0].tests.push(id);
        id
    }

    pub(crate) fn set_plan(&mut self, id: SuiteId, count: usize) {
        self.suites[id.0].plan = Some(count);
    }

    /// Move a test to its terminal state; a settled test never changes again
    pub(crate) fn settle(
        &mut self,
        id: TestId,
        outcome: Outcome,
        duration: Duration,
    ) -> Result<(), TreeError> {
        let test = &mut self.tests[id.0];
        if test.outcome.is_some() {
            return Err(TreeError::AlreadySettled {
                title: test.title.clone(),
            });
        }
        test.outcome = Some(outcome);
        test.duration = duration;
        Ok(())
    }
}

impl Default for TestTree {
    fn default() -> Self {
        Self::new()
    }
}
