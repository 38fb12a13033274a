//! Position arithmetic over a document snapshot
//!
//! A `Position` is a (line, column) pair ordered lexicographically, with
//! columns measured in chars within the line. The arithmetic here is the
//! foundation every seek primitive builds on: step to the next or previous
//! valid position, or jump by a signed char offset. All functions take the
//! document explicitly and return `None` instead of stepping out of bounds.

use crate::core::document::Document;

/// A location in a document: zero-based line and char column.
///
/// Ordered lexicographically, line first. A position at `line_len(line)`
/// sits after the last char of the line, before the line terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    /// Zero-based line index
    pub line: usize,
    /// Zero-based char column within the line
    pub column: usize,
}

impl Position {
    /// Create a position at the given line and column
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// The start of the document
    pub const fn zero() -> Self {
        Self::new(0, 0)
    }

    /// The start of the given line
    pub const fn line_start(line: usize) -> Self {
        Self::new(line, 0)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The position one char after `position`, crossing to the next line past
/// the end of a line. `None` at the very end of the document.
pub fn next(document: &Document, position: Position) -> Option<Position> {
    if position.column < document.line_len(position.line) {
        return Some(Position::new(position.line, position.column + 1));
    }

    if position.line + 1 >= document.line_count() {
        return None;
    }

    Some(Position::line_start(position.line + 1))
}

/// The position one char before `position`, crossing to the end of the
/// previous line at a line start. `None` at the start of the document.
pub fn previous(document: &Document, position: Position) -> Option<Position> {
    if position.column > 0 {
        return Some(Position::new(position.line, position.column - 1));
    }

    if position.line == 0 {
        return None;
    }

    let line = position.line - 1;
    Some(Position::new(line, document.line_len(line)))
}

/// The position `by` chars away from `position`, in either direction.
///
/// `0` returns the position unchanged; `1` and `-1` take the line-local
/// fast path instead of the linear offset round trip. `None` when the
/// result would fall outside the document.
pub fn offset(document: &Document, position: Position, by: isize) -> Option<Position> {
    match by {
        0 => Some(position),
        1 => next(document, position),
        -1 => previous(document, position),
        _ => {
            let target = document.offset_at(position) as isize + by;
            if target < 0 || target as usize > document.len_chars() {
                return None;
            }
            Some(document.position_at(target as usize))
        }
    }
}
