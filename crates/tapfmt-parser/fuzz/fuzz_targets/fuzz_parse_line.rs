// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for single-line classification

#![no_main]

use libfuzzer_sys::fuzz_target;

use tapfmt_parser::parse_line;

fuzz_target!(|data: &[u8]| {
    if let Ok(line) = std::str::from_utf8(data) {
        // Classification should never panic
        let _ = parse_line(line);
    }
});
