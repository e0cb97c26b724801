//! Source location tracking for the minic scanner
//!
//! Positions follow the scanner's column rules rather than a visual
//! tab-stop model: a tab always moves the column forward by a fixed width
//! and a carriage return rewinds to column 1 without starting a new line.
use crate::config::constants::compile_time::source::TAB_WIDTH;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in source text with line, column, and byte offset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    /// Byte offset from start of input (0-based)
    pub offset: usize,
    /// Line number (1-based)
    pub line: u32,
    /// Column number (1-based)
    pub column: u32,
}

impl Position {
    /// Create a new position
    pub fn new(offset: usize, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// Create the starting position (offset 0, line 1, column 1)
    pub fn start() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    /// Position after consuming `ch`
    pub fn advance(self, ch: char) -> Self {
        let offset = self.offset + ch.len_utf8();
        match ch {
            '\n' => Self {
                offset,
                line: self.line + 1,
                column: 1,
            },
            '\r' => Self {
                offset,
                line: self.line,
                column: 1,
            },
            '\t' => Self {
                offset,
                line: self.line,
                column: self.column + TAB_WIDTH,
            },
            _ => Self {
                offset,
                line: self.line,
                column: self.column + 1,
            },
        }
    }

    /// Advance position over every character of a string
    pub fn advance_str(self, s: &str) -> Self {
        s.chars().fold(self, |pos, ch| pos.advance(ch))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A span of source text from start to end position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Start position (inclusive)
    pub start: Position,
    /// End position (exclusive)
    pub end: Position,
}

impl Span {
    /// Create a new span
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(
            start.offset <= end.offset,
            "Span start must not be after end"
        );
        Self { start, end }
    }

    /// Get the start position of this span
    pub fn start(&self) -> Position {
        self.start
    }

    /// Get the end position of this span
    pub fn end(&self) -> Position {
        self.end
    }

    /// Zero-width span at a position (used for EOF)
    pub fn point(pos: Position) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Get the byte length of this span
    pub fn len(&self) -> usize {
        self.end.offset - self.start.offset
    }

    /// Check if this span is empty
    pub fn is_empty(&self) -> bool {
        self.start.offset == self.end.offset
    }

    /// Get the source text for this span from the input
    pub fn slice<'a>(&self, input: &'a str) -> &'a str {
        &input[self.start.offset..self.end.offset]
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(
                f,
                "{}:{}-{}",
                self.start.line, self.start.column, self.end.column
            )
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// A value with its source location
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Spanned<T> {
    /// The value
    pub value: T,
    /// The source span
    pub span: Span,
}

impl<T> Spanned<T> {
    /// Create a new spanned value
    pub fn new(value: T, span: Span) -> Self {
        Self { value, span }
    }

    /// Map the value while preserving the span
    pub fn map<U, F>(self, f: F) -> Spanned<U>
    where
        F: FnOnce(T) -> U,
    {
        Spanned {
            value: f(self.value),
            span: self.span,
        }
    }

    /// Get the inner value
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T: fmt::Display> fmt::Display for Spanned<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newline_starts_next_line() {
        let pos = Position::start().advance('a').advance('\n');
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 1);
        assert_eq!(pos.offset, 2);
    }

    #[test]
    fn test_tab_advances_fixed_width() {
        let pos = Position::start().advance('x').advance('\t');
        assert_eq!(pos.column, 2 + TAB_WIDTH);
        assert_eq!(pos.line, 1);
    }

    #[test]
    fn test_carriage_return_rewinds_column_only() {
        let pos = Position::start().advance_str("abc\r");
        assert_eq!(pos.line, 1);
        assert_eq!(pos.column, 1);
        assert_eq!(pos.offset, 4);
    }

    #[test]
    fn test_crlf_counts_one_line() {
        let pos = Position::start().advance_str("ab\r\ncd");
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 3);
    }

    #[test]
    fn test_multibyte_offset() {
        let pos = Position::start().advance('é');
        assert_eq!(pos.offset, 2);
        assert_eq!(pos.column, 2);
    }

    #[test]
    fn test_span_slice_and_display() {
        let source = "let x";
        let start = Position::start().advance_str("let ");
        let end = start.advance('x');
        let span = Span::new(start, end);
        assert_eq!(span.slice(source), "x");
        assert_eq!(span.len(), 1);
        assert_eq!(span.to_string(), "1:5-6");
        assert!(Span::point(start).is_empty());
    }

    #[test]
    fn test_spanned_map() {
        let spanned = Spanned::new(2, Span::point(Position::start())).map(|v| v * 21);
        assert_eq!(spanned.into_inner(), 42);
    }
}
