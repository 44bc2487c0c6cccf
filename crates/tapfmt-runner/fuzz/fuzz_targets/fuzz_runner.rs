// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for the runner
//!
//! Arbitrary bytes must always produce balanced suites and exactly one `end`.

#![no_main]

use std::cell::RefCell;
use std::rc::Rc;

use libfuzzer_sys::fuzz_target;

use tapfmt_runner::{EventKind, RunEvent, Runner};

fuzz_target!(|data: &[u8]| {
    let mut runner = Runner::new();
    let log: Rc<RefCell<Vec<EventKind>>> = Rc::new(RefCell::new(Vec::new()));
    for kind in [EventKind::Suite, EventKind::SuiteEnd, EventKind::End] {
        let log = Rc::clone(&log);
        runner.on(kind, move |_, event: &RunEvent| log.borrow_mut().push(event.kind()));
    }

    // The tokenizer only produces well-formed event sequences
    runner.write(data).expect("write");
    runner.end(None).expect("end");

    let log = log.borrow();
    let mut depth = 0usize;
    for kind in log.iter() {
        match kind {
            EventKind::Suite => depth += 1,
            EventKind::SuiteEnd => depth = depth.checked_sub(1).expect("balanced"),
            _ => {}
        }
    }
    assert_eq!(depth, 0);
    assert_eq!(log.last(), Some(&EventKind::End));
    assert_eq!(log.iter().filter(|k| **k == EventKind::End).count(), 1);
});
