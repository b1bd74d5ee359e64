//! Source positions used to attach diagnostics and postponed work to the
//! statement they came from.  Positions are line/column pairs in the
//! file that provided the statement; the [`Location`] pairs a position
//! with the file so that a snapshot of the processing stack can be kept
//! after the provider has moved on.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// A single point in a source file.  Lines and columns start at 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Position {
        Position { line, column }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("L{}:{}", self.line + 1, self.column + 1))
    }
}

/// The half open region of a source file covered by a statement, a field, or
/// an operand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Range {
        Range { start, end }
    }

    /// Creates a zero width range at `pos`
    pub fn at(pos: Position) -> Range {
        Range::new(pos, pos)
    }

    /// Creates a range covering the given columns of a single line
    pub fn on_line(line: u32, start: u32, end: u32) -> Range {
        Range::new(Position::new(line, start), Position::new(line, end))
    }

    pub fn zero() -> Range {
        Range::default()
    }

    /// Returns the smallest range which covers both `self` and `other`
    pub fn join(self, other: Range) -> Range {
        Range::new(self.start.min(other.start), self.end.max(other.end))
    }
}

impl Display for Range {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.start.fmt(f)
    }
}

/// A position within a named source file
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub pos: Position,
}

impl Location {
    pub fn new(file: &str, pos: Position) -> Location {
        Location {
            file: file.into(),
            pos,
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{}({})", self.file, self.pos))
    }
}
