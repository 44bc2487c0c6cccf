// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Runner: primitive TAP events in, semantic run events out
//!
//! The runner owns a [`Tokenizer`], a [`TestTree`] and a [`RunState`]. Every
//! primitive event updates the tree and state first, then the matching
//! semantic event is delivered to listeners, so a listener always sees the
//! tree as it stands after the event.
//!
//! Event ordering guarantees:
//!
//! - the root `suite` is the first event, emitted lazily on the first
//!   primitive event
//! - every `suite` has exactly one matching `suite end`, nested LIFO
//! - each test produces exactly one of `pass`, `fail` or `pending`
//! - `end` fires exactly once, last, after the root's `suite end`

use std::time::{Duration, Instant};

use tapfmt_parser::{Assertion, FinalResults, TapEvent, Tokenizer};
use tracing::{debug, info, trace, warn};

use crate::error::RunnerError;
use crate::observer::{EventKind, Observers, RunEvent, RunView};
use crate::state::RunState;
use crate::tree::{Outcome, SuiteId, TestError, TestStatus, TestTree};

/// Message given to a failed test whose diagnostics carry none
pub const DEFAULT_FAILURE_MESSAGE: &str = "unknown test failure";

/// Drives one TAP stream into a test tree and semantic events
#[derive(Debug)]
pub struct Runner {
    tokenizer: Tokenizer,
    tree: TestTree,
    state: RunState,
    observers: Observers,
    open: Vec<SuiteId>,
    started: bool,
    closed: bool,
    input_ended: bool,
    last_mark: Instant,
}

impl Runner {
    /// Create a runner with an empty tree
    #[must_use]
    pub fn new() -> Self {
        Self {
            tokenizer: Tokenizer::new(),
            tree: TestTree::new(),
            state: RunState::new(),
            observers: Observers::new(),
            open: Vec::new(),
            started: false,
            closed: false,
            input_ended: false,
            last_mark: Instant::now(),
        }
    }

    /// Register a listener for one kind of semantic event
    ///
    /// Listeners fire in registration order. Register before writing input;
    /// events already delivered are not replayed.
    pub fn on<F>(&mut self, kind: EventKind, listener: F)
    where
        F: FnMut(&RunView<'_>, &RunEvent) + 'static,
    {
        self.observers.on(kind, listener);
    }

    /// Feed a chunk of TAP bytes
    ///
    /// Returns `false` when the tokenizer's buffer is over its high-water
    /// mark; the caller should yield before writing more.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::StreamEnded`] after [`Runner::end`].
    pub fn write(&mut self, chunk: &[u8]) -> Result<bool, RunnerError> {
        if self.input_ended {
            return Err(RunnerError::StreamEnded);
        }
        let ready = self.tokenizer.write(chunk)?;
        self.drain()?;
        Ok(ready)
    }

    /// Signal end of input, optionally with a final chunk
    ///
    /// Closes every open suite and fires `end`.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::StreamEnded`] when called twice.
    pub fn end(&mut self, final_chunk: Option<&[u8]>) -> Result<(), RunnerError> {
        if self.input_ended {
            return Err(RunnerError::StreamEnded);
        }
        self.input_ended = true;
        self.tokenizer.end(final_chunk)?;
        self.drain()
    }

    fn drain(&mut self) -> Result<(), RunnerError> {
        for event in self.tokenizer.take_events() {
            self.apply(event)?;
        }
        Ok(())
    }

    /// Apply one primitive event
    ///
    /// [`Runner::write`] and [`Runner::end`] call this for every event the
    /// tokenizer produces; it is public so pre-tokenized streams can be
    /// replayed.
    ///
    /// # Errors
    ///
    /// Returns an error for a suite end with no open subtest, or for any
    /// event after the run was closed by a bailout or completion.
    pub fn apply(&mut self, event: TapEvent) -> Result<(), RunnerError> {
        if self.state.is_finalized() {
            return Err(RunnerError::EventAfterCompletion);
        }
        if self.closed && !matches!(event, TapEvent::Complete(_)) {
            return Err(RunnerError::EventAfterCompletion);
        }
        self.start();

        let now = Instant::now();
        let elapsed = now.saturating_duration_since(self.last_mark);
        self.last_mark = now;

        match event {
            TapEvent::Version { version } => debug!(version, "TAP version"),
            TapEvent::Comment { text } => trace!(comment = %text, "comment"),
            TapEvent::Extra { line } => trace!(line = %line, "unclassified line"),
            TapEvent::Plan(plan) => {
                let current = self.current();
                self.tree.set_plan(current, plan.count());
            }
            TapEvent::Assert(assertion) => self.add_test(assertion, elapsed)?,
            TapEvent::SubtestStart { name } => {
                let parent = self.current();
                let id = self.tree.add_suite(parent, name);
                debug!(suite = %self.tree.suite(id).title(), depth = self.open.len(), "suite start");
                self.open.push(id);
                self.emit(RunEvent::Suite(id));
            }
            TapEvent::SubtestEnd { summary } => {
                if self.open.len() <= 1 {
                    return Err(RunnerError::UnbalancedSuiteEnd);
                }
                if let Some(summary) = summary {
                    trace!(ok = summary.ok, name = %summary.name, "subtest summary");
                }
                if let Some(id) = self.open.pop() {
                    self.emit(RunEvent::SuiteEnd(id));
                }
            }
            TapEvent::Bailout { reason } => {
                warn!(reason = reason.as_deref().unwrap_or(""), "bail out");
                self.state.mark_bailout();
                self.close_all();
            }
            TapEvent::Complete(results) => self.complete(&results)?,
        }
        Ok(())
    }

    fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        let root = self.tree.root_id();
        self.open.push(root);
        self.emit(RunEvent::Suite(root));
    }

    fn current(&self) -> SuiteId {
        self.open
            .last()
            .copied()
            .unwrap_or_else(|| self.tree.root_id())
    }

    fn add_test(&mut self, assertion: Assertion, elapsed: Duration) -> Result<(), RunnerError> {
        let parent = self.current();
        let duration = assertion.time.unwrap_or(elapsed);
        let outcome = outcome_of(&assertion);
        let status = outcome.status();

        let id = self.tree.add_test(parent, assertion.name);
        self.tree.settle(id, outcome, duration)?;
        self.state.record(status)?;

        let event = match status {
            TestStatus::Passed => RunEvent::Pass(id),
            TestStatus::Failed => RunEvent::Fail(id),
            TestStatus::Pending => RunEvent::Pending(id),
        };
        self.emit(event);
        Ok(())
    }

    fn close_all(&mut self) {
        while let Some(id) = self.open.pop() {
            self.emit(RunEvent::SuiteEnd(id));
        }
        self.closed = true;
    }

    fn complete(&mut self, results: &FinalResults) -> Result<(), RunnerError> {
        self.close_all();
        let ok = self.state.finalize(results.ok)?;
        info!(
            ok,
            passed = self.state.passed(),
            failed = self.state.failed(),
            pending = self.state.pending(),
            bailed_out = self.state.bailed_out(),
            "run complete"
        );
        self.emit(RunEvent::End);
        Ok(())
    }

    fn emit(&mut self, event: RunEvent) {
        let view = RunView {
            tree: &self.tree,
            state: &self.state,
        };
        self.observers.emit(&view, &event);
    }

    /// The test tree built so far
    #[must_use]
    pub fn tree(&self) -> &TestTree {
        &self.tree
    }

    /// Counters and verdict so far
    #[must_use]
    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Whether `end` has fired
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state.is_finalized()
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

/// Settle an assertion: a directive always means pending, even on `not ok`
fn outcome_of(assertion: &Assertion) -> Outcome {
    if let Some(directive) = &assertion.directive {
        return Outcome::Pending {
            kind: directive.kind,
            reason: directive.reason.clone(),
        };
    }
    if assertion.ok {
        return Outcome::Passed;
    }
    let diagnostics = assertion.diagnostics.as_ref();
    Outcome::Failed(TestError {
        message: diagnostics
            .and_then(|d| d.message())
            .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string()),
        stack: diagnostics.and_then(|d| d.stack()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tapfmt_parser::{Directive, DirectiveKind, Plan};

    const ALL_KINDS: [EventKind; 6] = [
        EventKind::Suite,
        EventKind::Pending,
        EventKind::Pass,
        EventKind::Fail,
        EventKind::SuiteEnd,
        EventKind::End,
    ];

    fn recording_runner() -> (Runner, Rc<RefCell<Vec<RunEvent>>>) {
        let mut runner = Runner::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for kind in ALL_KINDS {
            let log = Rc::clone(&log);
            runner.on(kind, move |_, event| log.borrow_mut().push(*event));
        }
        (runner, log)
    }

    fn assertion(ok: bool, name: &str) -> Assertion {
        Assertion {
            ok,
            id: None,
            name: name.to_string(),
            directive: None,
            time: None,
            diagnostics: None,
        }
    }

    #[test]
    fn test_apply_flat_stream() {
        let (mut runner, log) = recording_runner();
        runner
            .apply(TapEvent::Plan(Plan { start: 1, end: 2 }))
            .unwrap();
        runner.apply(TapEvent::Assert(assertion(true, "a"))).unwrap();
        runner.apply(TapEvent::Assert(assertion(false, "b"))).unwrap();
        runner
            .apply(TapEvent::Complete(FinalResults {
                ok: false,
                count: 2,
                pass: 1,
                fail: 1,
                ..FinalResults::default()
            }))
            .unwrap();

        let kinds: Vec<EventKind> = log.borrow().iter().map(RunEvent::kind).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::Suite,
                EventKind::Pass,
                EventKind::Fail,
                EventKind::SuiteEnd,
                EventKind::End,
            ]
        );
        assert_eq!(runner.tree().root().plan(), Some(2));
        assert_eq!(runner.state().ok(), Some(false));
    }

    #[test]
    fn test_failed_test_gets_default_message() {
        let mut runner = Runner::new();
        runner.apply(TapEvent::Assert(assertion(false, "b"))).unwrap();
        let test = runner.tree().tests().next().expect("one test");
        let err = test.err().expect("failed test has err");
        assert_eq!(err.message, DEFAULT_FAILURE_MESSAGE);
        assert_eq!(err.stack, None);
    }

    #[test]
    fn test_not_ok_todo_is_pending() {
        let (mut runner, log) = recording_runner();
        let mut todo = assertion(false, "later");
        todo.directive = Some(Directive {
            kind: DirectiveKind::Todo,
            reason: Some("not built".into()),
        });
        runner.apply(TapEvent::Assert(todo)).unwrap();

        assert!(matches!(log.borrow()[1], RunEvent::Pending(_)));
        assert_eq!(runner.state().pending(), 1);
        assert_eq!(runner.state().failed(), 0);
    }

    #[test]
    fn test_time_directive_sets_duration() {
        let mut runner = Runner::new();
        let mut timed = assertion(true, "slow");
        timed.time = Some(Duration::from_millis(250));
        runner.apply(TapEvent::Assert(timed)).unwrap();
        let test = runner.tree().tests().next().expect("one test");
        assert_eq!(test.duration_ms(), 250);
    }

    #[test]
    fn test_unbalanced_suite_end() {
        let mut runner = Runner::new();
        let result = runner.apply(TapEvent::SubtestEnd { summary: None });
        assert!(matches!(result, Err(RunnerError::UnbalancedSuiteEnd)));
    }

    #[test]
    fn test_events_after_completion_are_rejected() {
        let mut runner = Runner::new();
        runner
            .apply(TapEvent::Complete(FinalResults {
                ok: true,
                ..FinalResults::default()
            }))
            .unwrap();
        let result = runner.apply(TapEvent::Assert(assertion(true, "late")));
        assert!(matches!(result, Err(RunnerError::EventAfterCompletion)));
        assert_eq!(runner.tree().test_count(), 0);
    }

    #[test]
    fn test_only_complete_follows_bailout() {
        let (mut runner, log) = recording_runner();
        runner
            .apply(TapEvent::Bailout {
                reason: Some("disk".into()),
            })
            .unwrap();
        let result = runner.apply(TapEvent::Assert(assertion(true, "late")));
        assert!(matches!(result, Err(RunnerError::EventAfterCompletion)));

        runner
            .apply(TapEvent::Complete(FinalResults {
                ok: false,
                bailed_out: true,
                ..FinalResults::default()
            }))
            .unwrap();
        let kinds: Vec<EventKind> = log.borrow().iter().map(RunEvent::kind).collect();
        assert_eq!(
            kinds,
            vec![EventKind::Suite, EventKind::SuiteEnd, EventKind::End]
        );
        assert!(runner.state().bailed_out());
    }

    #[test]
    fn test_write_after_end() {
        let mut runner = Runner::new();
        runner.end(None).unwrap();
        assert!(matches!(
            runner.write(b"ok 1\n"),
            Err(RunnerError::StreamEnded)
        ));
        assert!(matches!(runner.end(None), Err(RunnerError::StreamEnded)));
    }

    #[test]
    fn test_listener_sees_updated_tree() {
        let mut runner = Runner::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        runner.on(EventKind::Pass, move |view, event| {
            if let Some(id) = event.test() {
                let test = view.tree.test(id);
                sink.borrow_mut()
                    .push((test.title().to_string(), view.state.passed()));
            }
        });
        runner.write(b"ok 1 - one\nok 2 - two\n").unwrap();
        runner.end(None).unwrap();
        assert_eq!(
            *seen.borrow(),
            vec![("one".to_string(), 1), ("two".to_string(), 2)]
        );
    }
}
