// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use tapfmt_parser::{Tokenizer, tokenize};

fn sample_document(tests: usize) -> String {
    let mut doc = format!("TAP version 13\n1..{tests}\n");
    for i in 1..=tests {
        if i % 10 == 0 {
            doc.push_str(&format!(
                "not ok {i} - case {i}\n  ---\n  message: failed\n  stack: |\n    at case{i}\n  ...\n"
            ));
        } else if i % 7 == 0 {
            doc.push_str(&format!("ok {i} - case {i} # SKIP flaky\n"));
        } else {
            doc.push_str(&format!("ok {i} - case {i} # time=1.5ms\n"));
        }
    }
    doc
}

fn tokenizer_benchmark(c: &mut Criterion) {
    let doc = sample_document(1_000);
    let mut group = c.benchmark_group("tokenizer");
    group.throughput(Throughput::Bytes(doc.len() as u64));

    group.bench_function("whole_document", |b| {
        b.iter(|| std::hint::black_box(tokenize(&doc)))
    });

    group.bench_function("4k_chunks", |b| {
        b.iter(|| {
            let mut tokenizer = Tokenizer::new();
            for chunk in doc.as_bytes().chunks(4096) {
                let _ = tokenizer.write(chunk);
            }
            let _ = tokenizer.end(None);
            std::hint::black_box(tokenizer.take_events())
        })
    });

    group.finish();
}

criterion_group!(benches, tokenizer_benchmark);
criterion_main!(benches);
