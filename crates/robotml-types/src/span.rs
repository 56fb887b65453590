use serde::{Deserialize, Serialize};
use std::fmt;

/// Source location span.
///
/// All line/column values are 1-based. The parser may omit spans entirely,
/// in which case every field is zero (see [`Span::is_unknown`]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

impl Span {
    /// Create a new span.
    pub fn new(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        Self {
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// Create a zero-width span at a single position.
    pub fn point(line: u32, col: u32) -> Self {
        Self::new(line, col, line, col)
    }

    /// `true` when the parser did not supply a location for the node.
    pub fn is_unknown(&self) -> bool {
        self.start_line == 0
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unknown() {
            write!(f, "?:?")
        } else {
            write!(f, "{}:{}", self.start_line, self.start_col)
        }
    }
}
