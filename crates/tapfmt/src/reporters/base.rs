// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Pieces shared by the human-readable reporters

use std::time::Duration;

use tapfmt_runner::{RunView, TestId, TestStatus, TestTree};

use super::output::Output;

/// Suite path and test title, space-joined
pub(crate) fn test_full_title(tree: &TestTree, id: TestId) -> String {
    let suites = tree.full_title(id);
    let title = tree.test(id).title();
    match (suites.is_empty(), title.is_empty()) {
        (true, _) => title.to_string(),
        (false, true) => suites,
        (false, false) => format!("{suites} {title}"),
    }
}

/// Two spaces per nesting level
pub(crate) fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

/// Counts line followed by numbered failure details
pub(crate) fn epilogue(out: &mut Output, view: &RunView<'_>, elapsed: Duration) {
    let state = view.state;
    out.write_line("");
    out.write_line(&format!(
        "  {} passing ({}ms)",
        state.passed(),
        elapsed.as_millis()
    ));
    if state.pending() > 0 {
        out.write_line(&format!("  {} pending", state.pending()));
    }
    if state.failed() > 0 {
        out.write_line(&format!("  {} failing", state.failed()));
    }
    if state.bailed_out() {
        out.write_line("  bailed out");
    }

    let failures = view
        .tree
        .tests()
        .filter(|test| test.state() == Some(TestStatus::Failed));
    for (index, test) in failures.enumerate() {
        let Some(err) = test.err() else {
            continue;
        };
        out.write_line("");
        out.write_line(&format!(
            "  {}) {}:",
            index + 1,
            test_full_title(view.tree, test.id())
        ));
        for line in err.message.lines() {
            out.write_line(&format!("     {line}"));
        }
        for line in err.stack_or_empty().lines() {
            out.write_line(&format!("  {line}"));
        }
    }
    out.write_line("");
}
