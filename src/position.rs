//! Position type for points in the input stream.
//!
//! Positions count code points, not bytes, so they stay meaningful for any
//! input a reader can hold.

use std::fmt;

/// A point in the input, as an absolute offset plus its line coordinates.
///
/// All three fields are 0-indexed. `rel` is the offset within the current
/// line, i.e. `abs` minus the start index of line `line`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Absolute code-point offset from the start of the input.
    pub abs: usize,
    /// Line number (a CRLF pair counts as a single line break).
    pub line: usize,
    /// Code-point offset within the current line.
    pub rel: usize,
}

impl Position {
    /// Create a new position.
    pub fn new(abs: usize, line: usize, rel: usize) -> Self {
        Self { abs, line, rel }
    }

    /// Create a position at the start of the input.
    pub fn zero() -> Self {
        Self {
            abs: 0,
            line: 0,
            rel: 0,
        }
    }
}

impl fmt::Display for Position {
    /// Formats with 1-based line and column numbers, for diagnostics.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, pos {}", self.line + 1, self.rel + 1)
    }
}
