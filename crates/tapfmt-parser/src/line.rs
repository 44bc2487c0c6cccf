// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Single-line TAP classification
//!
//! [`parse_line`] looks at one line with its indentation already removed and
//! decides what kind of TAP line it is. It knows nothing about nesting or YAML
//! blocks; the [`Tokenizer`](crate::Tokenizer) handles those.

use std::time::Duration;

use crate::event::{Assertion, Directive, DirectiveKind, Plan};

/// A classified TAP line
#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    /// `TAP version N`
    Version(u32),
    /// `1..N [# reason]`
    Plan {
        /// The declared plan
        plan: Plan,
        /// Text after `#`, if any
        reason: Option<String>,
    },
    /// `ok` / `not ok`
    Assert(Assertion),
    /// `Bail out! [reason]`
    Bailout(Option<String>),
    /// `# Subtest[: name]`
    SubtestHeader(String),
    /// Any other `#` line
    Comment(String),
    /// Whitespace only
    Blank,
    /// Anything else
    Extra(String),
}

impl Line {
    /// Whether this line can open a nested subtest level when indented
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::Version(_)
                | Self::Plan { .. }
                | Self::Assert(_)
                | Self::Bailout(_)
                | Self::SubtestHeader(_)
        )
    }
}

/// Classify a single line of TAP
///
/// The line must not contain its newline, and leading indentation should
/// already have been stripped by the caller.
#[must_use]
pub fn parse_line(line: &str) -> Line {
    let line = line.trim_end();
    if line.trim_start().is_empty() {
        return Line::Blank;
    }

    if let Some(assertion) = parse_assertion(line) {
        return Line::Assert(assertion);
    }
    if let Some((plan, reason)) = parse_plan(line) {
        return Line::Plan { plan, reason };
    }
    if let Some(version) = parse_version(line) {
        return Line::Version(version);
    }
    if let Some(reason) = strip_prefix_ignore_case(line, "bail out!") {
        return Line::Bailout(non_empty(reason.trim()));
    }
    if let Some(comment) = line.strip_prefix('#') {
        let comment = comment.trim();
        if let Some(name) = strip_prefix_ignore_case(comment, "subtest") {
            if name.is_empty() || name.starts_with(':') {
                return Line::SubtestHeader(name.trim_start_matches(':').trim().to_string());
            }
        }
        return Line::Comment(comment.to_string());
    }

    Line::Extra(line.to_string())
}

fn parse_version(line: &str) -> Option<u32> {
    strip_prefix_ignore_case(line, "tap version ")?.trim().parse().ok()
}

fn parse_plan(line: &str) -> Option<(Plan, Option<String>)> {
    let (range, reason) = match line.split_once('#') {
        Some((range, reason)) => (range.trim(), non_empty(reason.trim())),
        None => (line.trim(), None),
    };
    let (start, end) = range.split_once("..")?;
    if !is_digits(start) || !is_digits(end) {
        return None;
    }
    let plan = Plan {
        start: start.parse().ok()?,
        end: end.parse().ok()?,
    };
    Some((plan, reason))
}

fn parse_assertion(line: &str) -> Option<Assertion> {
    let (ok, rest) = if let Some(rest) = line.strip_prefix("not ok") {
        (false, rest)
    } else if let Some(rest) = line.strip_prefix("ok") {
        (true, rest)
    } else {
        return None;
    };
    if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
        return None;
    }

    let rest = rest.trim_start();
    let digits = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let (id, rest) = if digits > 0 {
        (rest[..digits].parse().ok(), &rest[digits..])
    } else {
        (None, rest)
    };
    let rest = rest.trim_start();
    let rest = rest.strip_prefix("- ").unwrap_or(rest);
    let rest = if rest == "-" { "" } else { rest };

    let (description, directives) = split_directives(rest);
    let mut directive = None;
    let mut time = None;
    for segment in directives {
        if let Some(reason) = strip_directive_keyword(segment, "skip") {
            directive.get_or_insert(Directive {
                kind: DirectiveKind::Skip,
                reason: non_empty(reason),
            });
        } else if let Some(reason) = strip_directive_keyword(segment, "todo") {
            directive.get_or_insert(Directive {
                kind: DirectiveKind::Todo,
                reason: non_empty(reason),
            });
        } else if parse_time_millis(segment).is_some() {
            time = parse_time(segment);
        }
    }

    Some(Assertion {
        ok,
        id,
        name: unescape(description.trim()),
        directive,
        time,
        diagnostics: None,
    })
}

/// Split a description from its trailing `# DIRECTIVE` segments.
///
/// A `#` starts a directive only when it is unescaped, preceded by
/// whitespace, and followed by a known keyword; otherwise it stays in the
/// description (or in the preceding directive's reason).
fn split_directives(text: &str) -> (&str, Vec<&str>) {
    let cuts: Vec<usize> = text
        .match_indices('#')
        .map(|(idx, _)| idx)
        .filter(|&idx| !is_escaped(text, idx))
        .filter(|&idx| idx == 0 || text[..idx].ends_with(char::is_whitespace))
        .filter(|&idx| is_directive(&text[idx + 1..]))
        .collect();

    let Some(&first) = cuts.first() else {
        return (text, Vec::new());
    };
    let mut segments = Vec::with_capacity(cuts.len());
    for (n, &cut) in cuts.iter().enumerate() {
        let end = cuts.get(n + 1).copied().unwrap_or(text.len());
        segments.push(text[cut + 1..end].trim());
    }
    (&text[..first], segments)
}

fn is_directive(tail: &str) -> bool {
    let tail = tail.trim_start();
    strip_directive_keyword(tail, "skip").is_some()
        || strip_directive_keyword(tail, "todo").is_some()
        || parse_time_millis(tail).is_some()
}

/// Match a directive keyword prefix such as `SKIP`, `skipped` or `Todo:`.
fn strip_directive_keyword<'a>(segment: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = strip_prefix_ignore_case(segment, keyword)?;
    let word_end = rest
        .find(|c: char| c.is_whitespace())
        .unwrap_or(rest.len());
    if !rest[..word_end].chars().all(|c| c.is_ascii_alphabetic() || c == ':') {
        return None;
    }
    Some(rest[word_end..].trim())
}

/// Declared time of a `time=` directive
///
/// A value too large for a [`Duration`] is dropped; the segment is still a
/// directive.
fn parse_time(segment: &str) -> Option<Duration> {
    Duration::try_from_secs_f64(parse_time_millis(segment)? / 1000.0).ok()
}

fn parse_time_millis(segment: &str) -> Option<f64> {
    let value = segment.trim().strip_prefix("time=")?;
    let (number, scale) = if let Some(ms) = value.strip_suffix("ms") {
        (ms, 1.0)
    } else if let Some(secs) = value.strip_suffix('s') {
        (secs, 1000.0)
    } else {
        return None;
    };
    let millis: f64 = number.parse().ok()?;
    if !millis.is_finite() || millis < 0.0 {
        return None;
    }
    Some(millis * scale)
}

fn is_escaped(text: &str, idx: usize) -> bool {
    let backslashes = text[..idx]
        .bytes()
        .rev()
        .take_while(|&b| b == b'\\')
        .count();
    backslashes % 2 == 1
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if next == '#' || next == '\\' {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &text[prefix.len()..])
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}
