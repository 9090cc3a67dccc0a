//! Buffered, backtrackable code-point reader with position tracking.
//!
//! The reader decodes its whole input up front and keeps a stack of
//! savepoints, so patterns can speculate freely and roll back in O(1). It
//! also collects failed results pushed by transforms, so callers can ask for
//! the deepest point the parse reached.

use std::io::{self, Read};

use log::{debug, trace};

use crate::position::Position;
use crate::result::MatchResult;

/// Backtrackable input for one matching run.
///
/// A reader is exclusively owned by a single top-level match; patterns
/// themselves are shareable, readers are not.
pub struct Reader<V = ()> {
    buffer: Vec<char>,
    /// Start index of every line after the first, strictly increasing.
    line_starts: Vec<usize>,
    abs: usize,
    line: usize,
    /// Bottom entry is the `(0, 0)` sentinel; it is never popped.
    savepoints: Vec<(usize, usize)>,
    errors: Vec<MatchResult<V>>,
}

impl<V> Reader<V> {
    /// Decode the entire input into code points.
    ///
    /// Any read or decode error is fatal here; during matching the reader
    /// never errors, it reports end-of-input.
    pub fn new(mut input: impl Read) -> io::Result<Self> {
        let mut text = String::new();
        input.read_to_string(&mut text)?;
        Ok(Self::from_str(&text))
    }

    /// Build a reader over an in-memory string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(text: &str) -> Self {
        let buffer: Vec<char> = text.chars().collect();
        let line_starts = scan_line_starts(&buffer);
        debug!(
            "buffered {} code points over {} lines",
            buffer.len(),
            line_starts.len() + 1
        );
        Self {
            buffer,
            line_starts,
            abs: 0,
            line: 0,
            savepoints: vec![(0, 0)],
            errors: Vec::new(),
        }
    }

    /// The code point at the current position, without advancing.
    pub fn peek(&self) -> Option<char> {
        self.buffer.get(self.abs).copied()
    }

    /// Read one code point and advance, tracking line breaks.
    pub fn read(&mut self) -> Option<char> {
        let rune = self.buffer.get(self.abs).copied()?;
        self.abs += 1;
        if self.line < self.line_starts.len() && self.abs == self.line_starts[self.line] {
            self.line += 1;
        }
        Some(rune)
    }

    /// True once the whole input has been consumed.
    pub fn finished(&self) -> bool {
        self.abs >= self.buffer.len()
    }

    /// The current position as an `{abs, line, rel}` triple.
    pub fn position(&self) -> Position {
        let line_start = if self.line == 0 {
            0
        } else {
            self.line_starts[self.line - 1]
        };
        Position::new(self.abs, self.line, self.abs - line_start)
    }

    /// Push the current `(abs, line)` pair as a savepoint.
    pub fn push_state(&mut self) {
        self.savepoints.push((self.abs, self.line));
    }

    /// Pop the top savepoint and jump back to it.
    pub fn restore_state(&mut self) {
        debug_assert!(self.savepoints.len() > 1, "savepoint stack underflow");
        if self.savepoints.len() > 1
            && let Some((abs, line)) = self.savepoints.pop()
        {
            self.abs = abs;
            self.line = line;
        }
    }

    /// Discard the top savepoint, committing everything read since it.
    pub fn pop_state(&mut self) {
        debug_assert!(self.savepoints.len() > 1, "savepoint stack underflow");
        if self.savepoints.len() > 1 {
            self.savepoints.pop();
        }
    }

    /// The text between the top savepoint and the current position.
    pub fn string(&self) -> String {
        let from = self.savepoints.last().map_or(0, |&(abs, _)| abs);
        self.buffer[from..self.abs].iter().collect()
    }

    /// The text a result spans, sliced from the buffer by its positions.
    pub fn string_from_result(&self, result: &MatchResult<V>) -> String {
        self.buffer[result.begin.abs..result.end.abs].iter().collect()
    }

    /// Record a failed result for later diagnostics.
    ///
    /// Transforms are the customary callers, typically on partial failures
    /// that pinpoint where the input stopped making sense.
    pub fn push_error(&mut self, result: MatchResult<V>) {
        trace!("failure recorded at {}", result.end);
        self.errors.push(result);
    }

    /// The recorded failure that got the furthest, first pushed on ties.
    pub fn deepest_error(&self) -> Option<&MatchResult<V>> {
        let mut deepest: Option<&MatchResult<V>> = None;
        for error in &self.errors {
            if deepest.is_none_or(|d| error.end.abs > d.end.abs) {
                deepest = Some(error);
            }
        }
        deepest
    }

    #[cfg(test)]
    pub(crate) fn savepoint_depth(&self) -> usize {
        self.savepoints.len()
    }
}

/// Scan for line terminators: LF, CRLF (one terminator), or bare CR.
fn scan_line_starts(buffer: &[char]) -> Vec<usize> {
    let mut starts = Vec::new();
    let mut i = 0;
    while i < buffer.len() {
        match buffer[i] {
            '\n' => {
                starts.push(i + 1);
                i += 1;
            }
            '\r' => {
                if buffer.get(i + 1) == Some(&'\n') {
                    starts.push(i + 2);
                    i += 2;
                } else {
                    starts.push(i + 1);
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }
    starts
}
