// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Incremental TAP tokenizer
//!
//! The [`Tokenizer`] accepts arbitrary byte chunks, splits them into lines and
//! turns them into [`TapEvent`]s. It tracks subtest nesting through
//! indentation, attaches YAML diagnostics to the assertion they follow, and
//! computes the final aggregate verdict of the stream.
//!
//! # Example
//!
//! ```
//! use tapfmt_parser::{TapEvent, Tokenizer};
//!
//! let mut tokenizer = Tokenizer::new();
//! tokenizer.write(b"1..1\nok 1 - works\n").unwrap();
//! tokenizer.end(None).unwrap();
//!
//! let events = tokenizer.take_events();
//! assert!(matches!(events.last(), Some(TapEvent::Complete(results)) if results.ok));
//! ```

use tracing::{debug, trace, warn};

use crate::error::ParseError;
use crate::event::{Assertion, Diagnostics, DirectiveKind, FinalResults, Plan, TapEvent};
use crate::line::{Line, parse_line};

/// Partial-line bytes above which [`Tokenizer::write`] asks the caller to slow down
pub const HIGH_WATER_MARK: usize = 64 * 1024;

/// Spaces per subtest nesting level
const INDENT: usize = 4;

/// Extra spaces before a YAML diagnostics block
const YAML_INDENT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamState {
    Open,
    BailedOut,
    Ended,
}

#[derive(Debug)]
struct PendingAssert {
    assertion: Assertion,
    closes_subtest: bool,
}

/// Per-nesting-level bookkeeping
#[derive(Debug, Default)]
struct Level {
    plan: Option<Plan>,
    count: usize,
    pass: usize,
    fail: usize,
    skip: usize,
    todo: usize,
    failed_child: bool,
    pending: Option<PendingAssert>,
    yaml: Option<String>,
}

impl Level {
    fn plan_satisfied(&self) -> bool {
        match self.plan {
            Some(plan) => self.count == plan.count(),
            None => self.count == 0,
        }
    }

    fn verdict(&self) -> bool {
        self.fail == 0 && !self.failed_child && self.plan_satisfied()
    }

    fn record(&mut self, assertion: &Assertion) {
        self.count += 1;
        if assertion.is_failure() {
            self.fail += 1;
        } else {
            self.pass += 1;
        }
        match assertion.directive.as_ref().map(|d| d.kind) {
            Some(DirectiveKind::Skip) => self.skip += 1,
            Some(DirectiveKind::Todo) => self.todo += 1,
            None => {}
        }
    }
}

/// Streaming, lenient TAP tokenizer
///
/// Malformed input never fails; it becomes [`TapEvent::Extra`] or simply
/// lowers the final verdict. The only error is feeding input after
/// [`end`](Self::end).
#[derive(Debug)]
pub struct Tokenizer {
    buffer: Vec<u8>,
    levels: Vec<Level>,
    subtest_name: Option<String>,
    events: Vec<TapEvent>,
    state: StreamState,
    line_number: usize,
    results: Option<FinalResults>,
}

impl Tokenizer {
    /// Create a tokenizer for a fresh stream
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            levels: vec![Level::default()],
            subtest_name: None,
            events: Vec::new(),
            state: StreamState::Open,
            line_number: 0,
            results: None,
        }
    }

    /// Feed a chunk of bytes
    ///
    /// Complete lines are tokenized immediately; a trailing partial line is
    /// buffered. Returns `false` when the buffered partial line has grown past
    /// [`HIGH_WATER_MARK`], signalling the producer to back off. Input after a
    /// bailout is accepted and discarded.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Ended` if [`end`](Self::end) was already called.
    pub fn write(&mut self, chunk: &[u8]) -> Result<bool, ParseError> {
        match self.state {
            StreamState::Ended => return Err(ParseError::Ended),
            StreamState::BailedOut => return Ok(true),
            StreamState::Open => {}
        }

        self.buffer.extend_from_slice(chunk);
        let mut start = 0;
        while let Some(offset) = self.buffer[start..].iter().position(|&b| b == b'\n') {
            let end = start + offset;
            let line = String::from_utf8_lossy(&self.buffer[start..end]).into_owned();
            start = end + 1;
            self.process_line(&line);
            if self.state != StreamState::Open {
                self.buffer.clear();
                return Ok(true);
            }
        }
        self.buffer.drain(..start);

        Ok(self.buffer.len() < HIGH_WATER_MARK)
    }

    /// Signal the end of input, optionally with a final chunk
    ///
    /// Any unterminated last line is tokenized, open subtests are closed and
    /// [`TapEvent::Complete`] is queued. After a bailout the completion event
    /// has already been queued and this only seals the stream.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Ended` if called twice.
    pub fn end(&mut self, final_chunk: Option<&[u8]>) -> Result<(), ParseError> {
        if let Some(chunk) = final_chunk {
            self.write(chunk)?;
        }
        match self.state {
            StreamState::Ended => return Err(ParseError::Ended),
            StreamState::BailedOut => {
                self.state = StreamState::Ended;
                return Ok(());
            }
            StreamState::Open => {}
        }

        if !self.buffer.is_empty() {
            let line = String::from_utf8_lossy(&self.buffer).into_owned();
            self.buffer.clear();
            self.process_line(&line);
        }
        if self.state == StreamState::Open {
            self.finish();
        }
        self.state = StreamState::Ended;
        Ok(())
    }

    /// Drain all events queued so far, in stream order
    pub fn take_events(&mut self) -> Vec<TapEvent> {
        std::mem::take(&mut self.events)
    }

    /// Final results, available once the stream has completed
    #[must_use]
    pub fn final_results(&self) -> Option<&FinalResults> {
        self.results.as_ref()
    }

    /// Whether [`TapEvent::Complete`] has been produced
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.results.is_some()
    }

    fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    fn top(&mut self) -> &mut Level {
        let depth = self.depth();
        &mut self.levels[depth]
    }

    fn process_line(&mut self, raw: &str) {
        self.line_number += 1;
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        trace!(line_number = self.line_number, line, "tokenizing line");

        if self.top().yaml.is_some() && self.consume_yaml(line) {
            return;
        }

        let indent = line.len() - line.trim_start_matches(' ').len();
        let content = &line[indent..];
        if content.trim().is_empty() {
            return;
        }

        let depth = self.depth();
        if content.trim_end() == "---"
            && indent == depth * INDENT + YAML_INDENT
            && self.top().pending.is_some()
        {
            self.top().yaml = Some(String::new());
            return;
        }

        let line_depth = indent / INDENT;
        let parsed = parse_line(content);

        // Deeper noise such as stack traces stays on the current level
        if line_depth > depth && !parsed.is_structural() {
            self.handle(parsed);
            return;
        }

        if line_depth > depth {
            self.flush_level(depth);
            // An indented header names the level it sits on, unless the parent
            // already announced this level; then it names the next one down.
            let mut header = match &parsed {
                Line::SubtestHeader(name) if self.subtest_name.is_none() => Some(name.clone()),
                _ => None,
            };
            let header_consumed = header.is_some();
            for level in depth + 1..=line_depth {
                let inline = if level == line_depth { header.take() } else { None };
                let name = inline
                    .or_else(|| self.subtest_name.take())
                    .unwrap_or_default();
                debug!(depth = level, name = %name, "subtest started");
                self.events.push(TapEvent::SubtestStart { name });
                self.levels.push(Level::default());
            }
            if !header_consumed {
                self.handle(parsed);
            }
            return;
        }

        if line_depth < depth {
            while self.depth() > line_depth + 1 {
                self.close_level(None);
            }
            if let Line::Assert(summary) = parsed {
                self.close_level(Some(summary));
            } else {
                self.close_level(None);
                self.handle(parsed);
            }
            return;
        }

        self.handle(parsed);
    }

    fn handle(&mut self, line: Line) {
        match line {
            Line::Version(version) => self.emit(TapEvent::Version { version }),
            Line::Plan { plan, reason } => {
                if self.top().plan.is_some() {
                    warn!(line_number = self.line_number, "ignoring duplicate plan");
                    self.emit(TapEvent::Extra {
                        line: format!("{}..{}", plan.start, plan.end),
                    });
                    return;
                }
                self.top().plan = Some(plan);
                if let Some(reason) = reason {
                    debug!(reason = %reason, "plan carries a reason");
                }
                self.emit(TapEvent::Plan(plan));
            }
            Line::Assert(assertion) => {
                let depth = self.depth();
                self.flush_level(depth);
                self.subtest_name = None;
                self.top().pending = Some(PendingAssert {
                    assertion,
                    closes_subtest: false,
                });
            }
            Line::Bailout(reason) => self.bailout(reason),
            Line::SubtestHeader(name) => {
                let depth = self.depth();
                self.flush_level(depth);
                self.subtest_name = Some(name);
            }
            Line::Comment(text) => self.emit(TapEvent::Comment { text }),
            Line::Blank => {}
            Line::Extra(line) => {
                debug!(line_number = self.line_number, line = %line, "unparseable line");
                self.emit(TapEvent::Extra { line });
            }
        }
    }

    /// Queue an event, first flushing the assertion it follows
    fn emit(&mut self, event: TapEvent) {
        let depth = self.depth();
        self.flush_level(depth);
        self.events.push(event);
    }

    /// Consume a line inside a YAML block; returns `false` if the block was
    /// left without its `...` terminator and the line needs normal handling.
    fn consume_yaml(&mut self, line: &str) -> bool {
        let depth = self.depth();
        let block_indent = depth * INDENT + YAML_INDENT;
        let indent = line.len() - line.trim_start_matches(' ').len();

        if indent == block_indent && line[indent..].trim_end() == "..." {
            self.flush_level(depth);
            return true;
        }
        if line.trim().is_empty() {
            if let Some(yaml) = self.top().yaml.as_mut() {
                yaml.push('\n');
            }
            return true;
        }
        if indent >= block_indent {
            if let Some(yaml) = self.top().yaml.as_mut() {
                yaml.push_str(&line[block_indent..]);
                yaml.push('\n');
            }
            return true;
        }

        debug!(line_number = self.line_number, "unterminated YAML block");
        self.flush_level(depth);
        false
    }

    fn flush_level(&mut self, depth: usize) {
        let level = &mut self.levels[depth];
        let Some(PendingAssert {
            mut assertion,
            closes_subtest,
        }) = level.pending.take()
        else {
            return;
        };
        if let Some(raw) = level.yaml.take() {
            assertion.diagnostics = Some(Diagnostics::parse(raw));
        }
        level.record(&assertion);

        if closes_subtest {
            debug!(depth = depth + 1, ok = assertion.ok, "subtest ended");
            self.events.push(TapEvent::SubtestEnd {
                summary: Some(assertion),
            });
        } else {
            self.events.push(TapEvent::Assert(assertion));
        }
    }

    /// Pop the innermost level; a summary assertion is deferred so that a
    /// YAML block may still attach to it.
    fn close_level(&mut self, summary: Option<Assertion>) {
        let depth = self.depth();
        if depth == 0 {
            return;
        }
        self.flush_level(depth);
        let Some(child) = self.levels.pop() else {
            return;
        };
        match summary {
            Some(assertion) => {
                self.top().pending = Some(PendingAssert {
                    assertion,
                    closes_subtest: true,
                });
            }
            None => {
                if !child.verdict() {
                    self.top().failed_child = true;
                }
                debug!(depth, "subtest ended without summary");
                self.events.push(TapEvent::SubtestEnd { summary: None });
            }
        }
    }

    fn bailout(&mut self, reason: Option<String>) {
        for depth in (0..self.levels.len()).rev() {
            self.flush_level(depth);
        }
        warn!(reason = reason.as_deref().unwrap_or(""), "TAP stream bailed out");
        self.events.push(TapEvent::Bailout {
            reason: reason.clone(),
        });
        self.complete(Some(reason));
        self.state = StreamState::BailedOut;
    }

    fn finish(&mut self) {
        while self.depth() > 0 {
            self.close_level(None);
        }
        self.flush_level(0);
        self.complete(None);
    }

    fn complete(&mut self, bailout: Option<Option<String>>) {
        let top = &self.levels[0];
        if !top.plan_satisfied() {
            warn!(
                planned = top.plan.map(|p| p.count()),
                count = top.count,
                "plan not satisfied"
            );
        }
        let results = FinalResults {
            ok: bailout.is_none() && top.verdict(),
            count: top.count,
            pass: top.pass,
            fail: top.fail,
            skip: top.skip,
            todo: top.todo,
            plan: top.plan,
            bailed_out: bailout.is_some(),
            bailout: bailout.flatten(),
        };
        self.results = Some(results.clone());
        self.events.push(TapEvent::Complete(results));
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Tokenize a complete TAP document in one call
#[must_use]
pub fn tokenize(input: &str) -> Vec<TapEvent> {
    let mut tokenizer = Tokenizer::new();
    // A fresh tokenizer cannot be ended yet, so neither call can fail.
    let _ = tokenizer.write(input.as_bytes());
    let _ = tokenizer.end(None);
    tokenizer.take_events()
}
