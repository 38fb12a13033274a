//! Document: text storage implementing the host accessor contract
//!
//! A `Document` is the snapshot every position/seek primitive operates
//! against: `line_at`-style text access, (line, column) <-> linear char
//! offset conversion, and atomic edit batches. Hosts with their own buffer
//! storage mirror this API; the engine ships a ropey-backed implementation
//! so it can run (and be tested) headlessly.
//!
//! Edits are applied as one atomic batch per command invocation. Undo and
//! redo are strict linear stacks of edit batches; any fresh edit after an
//! undo clears the redo stack.

use std::collections::VecDeque;

use ropey::Rope;

use crate::core::error::EngineError;
use crate::core::position::Position;

/// Maximum undo stack depth to prevent unbounded history growth
const MAX_UNDO_DEPTH: usize = 1_000;

/// A single replacement requested by a command: `range` is replaced by
/// `text`. Ranges within one batch must not overlap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    /// Replaced range, endpoints in any order
    pub range: (Position, Position),
    /// Replacement text (empty for a deletion)
    pub text: String,
}

impl TextEdit {
    /// Replace the text between `start` and `end` with `text`
    pub fn replace(start: Position, end: Position, text: impl Into<String>) -> Self {
        Self {
            range: (start, end),
            text: text.into(),
        }
    }

    /// Insert `text` at `at`
    pub fn insert(at: Position, text: impl Into<String>) -> Self {
        Self::replace(at, at, text)
    }

    /// Delete the text between `start` and `end`
    pub fn delete(start: Position, end: Position) -> Self {
        Self::replace(start, end, String::new())
    }
}

/// One applied replacement, in coordinates of the document *before* the
/// batch, ascending by `start`. Used to remap positions through an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedChange {
    /// Char offset of the replaced range start (pre-batch coordinates)
    pub start: usize,
    /// Length in chars of the replaced text
    pub old_len: usize,
    /// Length in chars of the replacement
    pub new_len: usize,
}

/// A recorded replacement: `before` was the text at `at`, `after` is what
/// replaced it. Coordinates are valid in the document where `before` is
/// still present.
#[derive(Debug, Clone)]
struct Change {
    at: usize,
    before: String,
    after: String,
}

/// Text document backed by a rope, with linear undo/redo history
#[derive(Debug)]
pub struct Document {
    rope: Rope,
    /// Version counter, bumped on every applied batch (including undo/redo)
    version: u64,
    undo_stack: VecDeque<Vec<Change>>,
    redo_stack: VecDeque<Vec<Change>>,
}

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Self::from_text("")
    }

    /// Create a document from initial text
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            version: 0,
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
        }
    }

    /// Number of lines, counting a trailing empty line after a final newline
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Total length in chars
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Version counter for change tracking
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Text of the given line, without its line terminator
    pub fn line_text(&self, line: usize) -> String {
        let slice = self.rope.line(line);
        let len = self.line_len(line);
        slice.slice(..len).to_string()
    }

    /// Length in chars of the given line, without its line terminator
    pub fn line_len(&self, line: usize) -> usize {
        let slice = self.rope.line(line);
        let mut len = slice.len_chars();
        if len > 0 && slice.char(len - 1) == '\n' {
            len -= 1;
        }
        if len > 0 && slice.char(len - 1) == '\r' {
            len -= 1;
        }
        len
    }

    /// Linear char offset of a position
    pub fn offset_at(&self, position: Position) -> usize {
        let line_start = self.rope.line_to_char(position.line);
        line_start + position.column
    }

    /// Like `offset_at`, but rejects positions outside the document
    /// instead of panicking on them
    fn validated_offset(&self, position: Position) -> Result<usize, EngineError> {
        if position.line >= self.rope.len_lines() {
            return Err(EngineError::InvalidEdit(format!(
                "line {} exceeds line count {}",
                position.line,
                self.rope.len_lines()
            )));
        }
        let line_start = self.rope.line_to_char(position.line);
        if position.column > self.rope.line(position.line).len_chars() {
            return Err(EngineError::InvalidEdit(format!(
                "column {} exceeds the length of line {}",
                position.column, position.line
            )));
        }
        Ok(line_start + position.column)
    }

    /// Position of a linear char offset
    pub fn position_at(&self, offset: usize) -> Position {
        let offset = offset.min(self.rope.len_chars());
        let line = self.rope.char_to_line(offset);
        let column = offset - self.rope.line_to_char(line);
        Position::new(line, column)
    }

    /// The last valid position of the document
    pub fn last_position(&self) -> Position {
        self.position_at(self.rope.len_chars())
    }

    /// Character at a char offset, or `None` past the end
    pub fn char_at(&self, offset: usize) -> Option<char> {
        if offset < self.rope.len_chars() {
            Some(self.rope.char(offset))
        } else {
            None
        }
    }

    /// Forward char iterator starting at `offset`
    pub fn chars_from(&self, offset: usize) -> ropey::iter::Chars<'_> {
        self.rope.chars_at(offset)
    }

    /// Backward char iterator yielding the chars before `offset`,
    /// closest first
    pub fn chars_before(&self, offset: usize) -> impl Iterator<Item = char> + '_ {
        self.rope.chars_at(offset).reversed()
    }

    /// Full document text
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Text between two positions (endpoints in any order)
    pub fn text_in(&self, a: Position, b: Position) -> String {
        let (start, end) = if a <= b { (a, b) } else { (b, a) };
        self.rope
            .slice(self.offset_at(start)..self.offset_at(end))
            .to_string()
    }

    /// Apply a batch of edits atomically.
    ///
    /// Ranges are validated against the current snapshot and must not
    /// overlap. On success the batch is pushed as one undo step, the redo
    /// stack is cleared, and the applied changes are returned (ascending,
    /// pre-batch coordinates) so callers can remap selections synchronously.
    pub fn apply_edit(&mut self, edits: &[TextEdit]) -> Result<Vec<AppliedChange>, EngineError> {
        let mut changes = Vec::with_capacity(edits.len());

        for edit in edits {
            let (a, b) = edit.range;
            let (start, end) = if a <= b { (a, b) } else { (b, a) };
            let start = self.validated_offset(start)?;
            let end = self.validated_offset(end)?;

            changes.push(Change {
                at: start,
                before: self.rope.slice(start..end).to_string(),
                after: edit.text.clone(),
            });
        }

        changes.sort_by_key(|c| c.at);

        let mut previous_end = 0usize;
        for change in &changes {
            if change.at < previous_end {
                return Err(EngineError::InvalidEdit(
                    "edit ranges overlap".to_string(),
                ));
            }
            previous_end = change.at + change.before.chars().count();
        }

        let (applied, revert) = self.apply_group(changes);

        self.undo_stack.push_back(revert);
        if self.undo_stack.len() > MAX_UNDO_DEPTH {
            self.undo_stack.pop_front();
        }
        self.redo_stack.clear();
        self.version += 1;

        Ok(applied)
    }

    /// Undo the most recent edit batch. Returns the applied changes for
    /// selection remapping, or `None` if there is nothing to undo.
    pub fn undo(&mut self) -> Option<Vec<AppliedChange>> {
        let group = self.undo_stack.pop_back()?;
        let (applied, revert) = self.apply_group(group);
        self.redo_stack.push_back(revert);
        self.version += 1;
        Some(applied)
    }

    /// Redo the most recently undone edit batch
    pub fn redo(&mut self) -> Option<Vec<AppliedChange>> {
        let group = self.redo_stack.pop_back()?;
        let (applied, revert) = self.apply_group(group);
        self.undo_stack.push_back(revert);
        self.version += 1;
        Some(applied)
    }

    /// Apply a group of changes (ascending, coordinates valid in the
    /// current snapshot) and return the applied-change list plus the
    /// inverse group valid in the resulting snapshot.
    fn apply_group(&mut self, changes: Vec<Change>) -> (Vec<AppliedChange>, Vec<Change>) {
        for change in changes.iter().rev() {
            let end = change.at + change.before.chars().count();
            self.rope.remove(change.at..end);
            if !change.after.is_empty() {
                self.rope.insert(change.at, &change.after);
            }
        }

        let mut delta = 0isize;
        let mut applied = Vec::with_capacity(changes.len());
        let mut revert = Vec::with_capacity(changes.len());

        for change in changes {
            let old_len = change.before.chars().count();
            let new_len = change.after.chars().count();

            applied.push(AppliedChange {
                start: change.at,
                old_len,
                new_len,
            });
            revert.push(Change {
                at: (change.at as isize + delta) as usize,
                before: change.after,
                after: change.before,
            });
            delta += new_len as isize - old_len as isize;
        }

        (applied, revert)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Remap a char offset through an applied edit batch.
///
/// Offsets before a change are unaffected, offsets after it shift by the
/// change's length delta, and offsets inside a replaced range are clamped
/// into the replacement.
pub fn map_offset(changes: &[AppliedChange], offset: usize) -> usize {
    let mut delta = 0isize;

    for change in changes {
        if offset < change.start {
            break;
        }

        let old_end = change.start + change.old_len;
        if offset >= old_end {
            delta += change.new_len as isize - change.old_len as isize;
            continue;
        }

        let rel = (offset - change.start).min(change.new_len);
        return (change.start as isize + delta) as usize + rel;
    }

    (offset as isize + delta) as usize
}
