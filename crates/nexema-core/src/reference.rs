//! Source positions carried by every token, AST node and diagnostic.

use std::fmt;
use std::path::{Path, PathBuf};

/// A single point in a source file: a byte offset, the 0-based column within
/// the current line, and the 1-based line number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
}

impl Position {
    pub const fn new(offset: usize, line: usize) -> Self {
        Position { offset, line }
    }

    pub const fn start() -> Self {
        Position { offset: 0, line: 1 }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.offset)
    }
}

/// A half-open range between two [`Position`]s.
///
/// `end` is exclusive. `line_start`/`line_end` are cached separately from
/// `start.line`/`end.line` so a span can be constructed before both
/// endpoints are known (the tokenizer fills `end` in once scanning of a
/// token completes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line_start: usize,
    pub line_end: usize,
}

impl Span {
    pub const fn new(start: usize, end: usize, line_start: usize, line_end: usize) -> Self {
        Span {
            start,
            end,
            line_start,
            line_end,
        }
    }

    /// A span covering just the given position (used for EOF/illegal tokens
    /// and for diagnostics that do not span a token).
    pub const fn at(pos: Position) -> Self {
        Span {
            start: pos.offset,
            end: pos.offset,
            line_start: pos.line,
            line_end: pos.line,
        }
    }

    pub fn from_positions(start: Position, end: Position) -> Self {
        Span {
            start: start.offset,
            end: end.offset,
            line_start: start.line,
            line_end: end.line,
        }
    }

    /// Merges two spans into the smallest span containing both.
    pub fn merge(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            line_start: self.line_start.min(other.line_start),
            line_end: self.line_end.max(other.line_end),
        }
    }
}

/// A file path paired with a span within that file. Every diagnostic carries
/// a non-empty reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    pub file_path: PathBuf,
    pub span: Span,
}

impl Reference {
    pub fn new(file_path: impl Into<PathBuf>, span: Span) -> Self {
        Reference {
            file_path: file_path.into(),
            span,
        }
    }

    pub fn file(&self) -> &Path {
        &self.file_path
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.file_path.display(),
            self.span.line_start,
            self.span.start
        )
    }
}
