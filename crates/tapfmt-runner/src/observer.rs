// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Semantic run events and the listener registry
//!
//! Listeners receive a [`RunView`] (read-only tree and state) plus the event.
//! All listeners run synchronously, in registration order.

use std::fmt;

use crate::state::RunState;
use crate::tree::{SuiteId, TestId, TestTree};

/// Kinds of semantic events a listener can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A suite opened
    Suite,
    /// A test settled as skipped or todo
    Pending,
    /// A test passed
    Pass,
    /// A test failed
    Fail,
    /// A suite closed
    SuiteEnd,
    /// The run completed; fired exactly once, last
    End,
}

impl EventKind {
    /// Event name as used by mocha-style reporters
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Suite => "suite",
            Self::Pending => "pending",
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::SuiteEnd => "suite end",
            Self::End => "end",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A semantic event with its subject
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEvent {
    /// A suite opened
    Suite(SuiteId),
    /// A test settled as pending
    Pending(TestId),
    /// A test passed
    Pass(TestId),
    /// A test failed
    Fail(TestId),
    /// A suite closed
    SuiteEnd(SuiteId),
    /// The run completed
    End,
}

impl RunEvent {
    /// Kind of this event
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Suite(_) => EventKind::Suite,
            Self::Pending(_) => EventKind::Pending,
            Self::Pass(_) => EventKind::Pass,
            Self::Fail(_) => EventKind::Fail,
            Self::SuiteEnd(_) => EventKind::SuiteEnd,
            Self::End => EventKind::End,
        }
    }

    /// Test subject, for pending/pass/fail
    #[must_use]
    pub fn test(&self) -> Option<TestId> {
        match self {
            Self::Pending(id) | Self::Pass(id) | Self::Fail(id) => Some(*id),
            _ => None,
        }
    }

    /// Suite subject, for suite/suite end
    #[must_use]
    pub fn suite(&self) -> Option<SuiteId> {
        match self {
            Self::Suite(id) | Self::SuiteEnd(id) => Some(*id),
            _ => None,
        }
    }
}

/// Read-only view of a run handed to listeners
#[derive(Debug, Clone, Copy)]
pub struct RunView<'a> {
    /// The test tree built so far
    pub tree: &'a TestTree,
    /// Counters and verdict so far
    pub state: &'a RunState,
}

/// Boxed listener callback
pub type Listener = Box<dyn FnMut(&RunView<'_>, &RunEvent)>;

/// Ordered listener registry
#[derive(Default)]
pub struct Observers {
    listeners: Vec<(EventKind, Listener)>,
}

impl Observers {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for events of `kind`
    pub fn on<F>(&mut self, kind: EventKind, listener: F)
    where
        F: FnMut(&RunView<'_>, &RunEvent) + 'static,
    {
        self.listeners.push((kind, Box::new(listener)));
    }

    /// Deliver `event` to every listener of its kind, in registration order
    pub fn emit(&mut self, view: &RunView<'_>, event: &RunEvent) {
        let kind = event.kind();
        for (_, listener) in self.listeners.iter_mut().filter(|(k, _)| *k == kind) {
            listener(view, event);
        }
    }

    /// Number of registered listeners
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether no listener is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_event_names() {
        assert_eq!(EventKind::SuiteEnd.name(), "suite end");
        assert_eq!(EventKind::End.to_string(), "end");
        assert_eq!(RunEvent::End.kind(), EventKind::End);
    }

    #[test]
    fn test_listeners_fire_in_registration_order() {
        let tree = TestTree::new();
        let state = RunState::new();
        let view = RunView {
            tree: &tree,
            state: &state,
        };
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut observers = Observers::new();

        for label in ["first", "second", "third"] {
            let log = Rc::clone(&log);
            observers.on(EventKind::End, move |_, _| log.borrow_mut().push(label));
        }
        let other = Rc::clone(&log);
        observers.on(EventKind::Suite, move |_, _| other.borrow_mut().push("suite"));

        observers.emit(&view, &RunEvent::End);
        assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
        assert_eq!(observers.len(), 4);
    }

    #[test]
    fn test_subjects() {
        let tree = TestTree::new();
        let root = tree.root_id();
        assert_eq!(RunEvent::Suite(root).suite(), Some(root));
        assert_eq!(RunEvent::Suite(root).test(), None);
        assert_eq!(RunEvent::End.suite(), None);
    }
}
