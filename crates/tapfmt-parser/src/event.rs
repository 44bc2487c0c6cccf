// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Primitive TAP events
//!
//! These are the events produced by the [`Tokenizer`](crate::Tokenizer). They
//! describe what the stream said, not what it means for a test tree; building
//! the tree is the job of the runner.

use std::time::Duration;

use serde::Serialize;

/// A single primitive event from the TAP stream
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TapEvent {
    /// `TAP version N`
    Version {
        /// Declared protocol version
        version: u32,
    },
    /// `1..N` plan line
    Plan(Plan),
    /// `ok` / `not ok` line, with any YAML diagnostics attached
    Assert(Assertion),
    /// `# ...` comment line
    Comment {
        /// Comment text without the leading `#`
        text: String,
    },
    /// A nested subtest begins
    SubtestStart {
        /// Subtest name from the `# Subtest:` header, empty if unannounced
        name: String,
    },
    /// The innermost open subtest ends
    SubtestEnd {
        /// Parent-level assertion that summarized the subtest, if one followed it
        summary: Option<Assertion>,
    },
    /// `Bail out!`
    Bailout {
        /// Reason given after `Bail out!`, if any
        reason: Option<String>,
    },
    /// A line the tokenizer could not classify
    Extra {
        /// The raw line
        line: String,
    },
    /// The stream is complete; always the last event
    Complete(FinalResults),
}

/// A plan declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Plan {
    /// First test id (normally 1)
    pub start: usize,
    /// Last test id; `1..0` means "skip everything"
    pub end: usize,
}

impl Plan {
    /// Number of assertions the plan announces
    #[must_use]
    pub fn count(&self) -> usize {
        self.end.saturating_add(1).saturating_sub(self.start)
    }

    /// Whether the plan declares that all tests were skipped (`1..0`)
    #[must_use]
    pub fn skip_all(&self) -> bool {
        self.count() == 0
    }
}

/// Kind of directive attached to an assertion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectiveKind {
    /// `# SKIP`
    Skip,
    /// `# TODO`
    Todo,
}

/// `# SKIP` / `# TODO` directive with its optional reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Directive {
    /// Directive kind
    pub kind: DirectiveKind,
    /// Free text after the directive keyword
    pub reason: Option<String>,
}

/// A single `ok` / `not ok` line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assertion {
    /// Whether the line started with `ok`
    pub ok: bool,
    /// Test id, if the line carried one
    pub id: Option<usize>,
    /// Description with the leading `- ` and escapes removed
    pub name: String,
    /// Skip/todo directive, if any
    pub directive: Option<Directive>,
    /// Time declared by a `# time=Nms` directive
    pub time: Option<Duration>,
    /// YAML diagnostics block following the line
    pub diagnostics: Option<Diagnostics>,
}

impl Assertion {
    /// Whether this assertion counts as a failure for the run
    ///
    /// `not ok` lines carrying a directive are excused.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        !self.ok && self.directive.is_none()
    }
}

/// YAML diagnostics attached to an assertion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostics {
    /// The block exactly as written, without the `---` / `...` markers
    pub raw: String,
    /// Parsed block, `None` if the YAML was malformed
    pub value: Option<serde_yaml::Value>,
}

impl Diagnostics {
    /// Parse a raw YAML block
    ///
    /// Malformed YAML is kept verbatim in `raw`; it is never an error.
    #[must_use]
    pub fn parse(raw: String) -> Self {
        let value = match serde_yaml::from_str::<serde_yaml::Value>(&raw) {
            Ok(value) if value.is_mapping() => Some(value),
            Ok(_) => None,
            Err(err) => {
                tracing::debug!(error = %err, "ignoring malformed YAML diagnostics");
                None
            }
        };
        Self { raw, value }
    }

    /// Look up a scalar field and render it as a string
    #[must_use]
    pub fn field(&self, key: &str) -> Option<String> {
        let value = self.value.as_ref()?.get(key)?;
        match value {
            serde_yaml::Value::String(s) => Some(s.clone()),
            serde_yaml::Value::Number(n) => Some(n.to_string()),
            serde_yaml::Value::Bool(b) => Some(b.to_string()),
            serde_yaml::Value::Null => None,
            other => serde_yaml::to_string(other).ok().map(|s| s.trim_end().to_string()),
        }
    }

    /// The `message` field, if present
    #[must_use]
    pub fn message(&self) -> Option<String> {
        self.field("message")
    }

    /// The `stack` field, if present
    #[must_use]
    pub fn stack(&self) -> Option<String> {
        self.field("stack")
    }
}

/// Aggregate results reported with [`TapEvent::Complete`]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FinalResults {
    /// Overall verdict of the stream
    pub ok: bool,
    /// Top-level assertions seen
    pub count: usize,
    /// Passing top-level assertions (including skip/todo)
    pub pass: usize,
    /// Failing top-level assertions (excluding todo)
    pub fail: usize,
    /// Top-level assertions with a `# SKIP` directive
    pub skip: usize,
    /// Top-level assertions with a `# TODO` directive
    pub todo: usize,
    /// Top-level plan, if one was declared
    pub plan: Option<Plan>,
    /// Bailout reason, if the stream bailed out
    pub bailout: Option<String>,
    /// Whether the stream bailed out
    pub bailed_out: bool,
}
