// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for the reporters
//!
//! Arbitrary input split at an arbitrary point must format without error,
//! and every rendering reporter must agree on the outcome.

#![no_main]

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use tapfmt::{Formatter, ReporterKind, ReporterOptions, RunOutcome};

#[derive(Debug, Arbitrary)]
struct Input<'a> {
    split: usize,
    data: &'a [u8],
}

#[derive(Clone, Default)]
struct Captured(Rc<RefCell<Vec<u8>>>);

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn format(kind: ReporterKind, input: &Input<'_>) -> (RunOutcome, Vec<u8>) {
    let captured = Captured::default();
    let mut formatter =
        Formatter::with_kind(kind, &ReporterOptions::default(), Box::new(captured.clone()))
            .expect("formatter");
    let split = input.split % (input.data.len() + 1);
    let (head, tail) = input.data.split_at(split);
    formatter.write(head).expect("write head");
    formatter.write(tail).expect("write tail");
    formatter.end().expect("end");
    let outcome = formatter.finish().expect("finish");
    let bytes = captured.0.borrow().clone();
    (outcome, bytes)
}

fuzz_target!(|input: Input<'_>| {
    let (expected, _) = format(ReporterKind::Silent, &input);
    for kind in ReporterKind::ALL {
        if kind.is_passthrough() {
            format(kind, &input);
            continue;
        }
        let (outcome, bytes) = format(kind, &input);
        assert_eq!(outcome, expected, "{kind} disagrees");
        if kind == ReporterKind::Json {
            serde_json::from_slice::<serde_json::Value>(&bytes).expect("valid JSON");
        }
    }
});
