// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for the streaming tokenizer
//!
//! Feeds arbitrary bytes in arbitrary chunk sizes and checks that the stream
//! always ends with exactly one `Complete` event.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use tapfmt_parser::{TapEvent, Tokenizer};

#[derive(Debug, Arbitrary)]
struct Input {
    chunk_size: u8,
    data: Vec<u8>,
}

fuzz_target!(|input: Input| {
    let mut tokenizer = Tokenizer::new();
    let chunk_size = usize::from(input.chunk_size).max(1);

    // Writing should never panic
    for chunk in input.data.chunks(chunk_size) {
        let _ = tokenizer.write(chunk);
    }
    let _ = tokenizer.end(None);

    let events = tokenizer.take_events();
    let completes = events
        .iter()
        .filter(|e| matches!(e, TapEvent::Complete(_)))
        .count();
    assert_eq!(completes, 1);
    assert!(matches!(events.last(), Some(TapEvent::Complete(_))));

    let starts = events
        .iter()
        .filter(|e| matches!(e, TapEvent::SubtestStart { .. }))
        .count();
    let ends = events
        .iter()
        .filter(|e| matches!(e, TapEvent::SubtestEnd { .. }))
        .count();
    // A bailout leaves subtests open; the runner closes them.
    assert!(ends <= starts);
});
