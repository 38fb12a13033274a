//! Selection Model
//!
//! A `Selection` is an anchor/active pair of positions. The active end is
//! the one that moves; when it sits before the anchor the selection is
//! reversed. `Shift` describes how a motion reshapes a selection and
//! `SelectionBehavior` distinguishes caret-style (empty selections allowed)
//! from character-style (every selection covers at least one char) editing.

use crate::core::document::Document;
use crate::core::position::{self, Position};

// =============================================================================
// DIRECTION / SHIFT / BEHAVIOR
// =============================================================================

/// Direction of a motion or search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Toward the end of the document
    Forward,
    /// Toward the start of the document
    Backward,
}

impl Direction {
    /// `+1` for forward, `-1` for backward
    pub const fn delta(self) -> isize {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }

    /// Parse the numeric encoding used in command arguments
    pub const fn from_delta(delta: isize) -> Option<Self> {
        match delta {
            1 => Some(Direction::Forward),
            -1 => Some(Direction::Backward),
            _ => None,
        }
    }
}

/// How a motion reshapes the selection that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shift {
    /// Collapse to an empty selection at the target
    Jump,
    /// Select from the previous active position to the target
    Select,
    /// Keep the anchor, move the active end to the target
    Extend,
}

impl Shift {
    /// Parse the string encoding used in command arguments
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "jump" => Some(Shift::Jump),
            "select" => Some(Shift::Select),
            "extend" => Some(Shift::Extend),
            _ => None,
        }
    }
}

/// Per-editor selection semantics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionBehavior {
    /// Selections are between-character ranges; empty selections are
    /// meaningful carets.
    #[default]
    Caret,
    /// Every selection covers at least one character; a one-char
    /// selection plays the role of a caret.
    Character,
}

// =============================================================================
// SELECTION
// =============================================================================

/// A directed range of text: `anchor` is the fixed end, `active` the
/// moving end (where the caret is drawn).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Selection {
    /// The fixed end
    pub anchor: Position,
    /// The moving end
    pub active: Position,
}

impl Selection {
    /// Create a selection from anchor to active
    pub const fn new(anchor: Position, active: Position) -> Self {
        Self { anchor, active }
    }

    /// Create an empty selection at `position`
    pub const fn empty(position: Position) -> Self {
        Self::new(position, position)
    }

    /// Create a selection between two char offsets of `document`
    pub fn from_offsets(document: &Document, anchor: usize, active: usize) -> Self {
        Self::new(document.position_at(anchor), document.position_at(active))
    }

    /// True when anchor and active coincide
    pub fn is_empty(&self) -> bool {
        self.anchor == self.active
    }

    /// True when the active end sits before the anchor
    pub fn is_reversed(&self) -> bool {
        self.active < self.anchor
    }

    /// The lesser of the two endpoints
    pub fn start(&self) -> Position {
        if self.is_reversed() {
            self.active
        } else {
            self.anchor
        }
    }

    /// The greater of the two endpoints
    pub fn end(&self) -> Position {
        if self.is_reversed() {
            self.anchor
        } else {
            self.active
        }
    }

    /// Length of the covered text in chars
    pub fn len(&self, document: &Document) -> usize {
        document.offset_at(self.end()) - document.offset_at(self.start())
    }

    /// The covered text
    pub fn text(&self, document: &Document) -> String {
        document.text_in(self.start(), self.end())
    }

    /// Reshape this selection so its active end lands on `position`,
    /// according to `shift`
    pub fn shifted(&self, position: Position, shift: Shift) -> Self {
        match shift {
            Shift::Jump => Selection::empty(position),
            Shift::Select => Selection::new(self.active, position),
            Shift::Extend => Selection::new(self.anchor, position),
        }
    }

    /// The position a seek in `direction` starts from.
    ///
    /// With caret behavior this is always the active position. With
    /// character behavior the active position is nudged one char into the
    /// selection so that the character under the block caret is not
    /// sought again: forward seeks from a reversed selection start after
    /// the caret char, backward seeks from a forward-facing selection
    /// start before it.
    pub fn seek_from(
        &self,
        document: &Document,
        behavior: SelectionBehavior,
        direction: Direction,
    ) -> Position {
        if behavior != SelectionBehavior::Character || self.is_empty() {
            return self.active;
        }

        match direction {
            Direction::Forward if self.is_reversed() => {
                match position::next(document, self.active) {
                    Some(p) => p,
                    None => self.active,
                }
            }
            Direction::Backward if !self.is_reversed() => {
                match position::previous(document, self.active) {
                    Some(p) => p,
                    None => self.active,
                }
            }
            _ => self.active,
        }
    }
}

impl std::fmt::Display for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.anchor, self.active)
    }
}

/// Sort selections by their start position, stably
pub fn sort_selections(selections: &mut [Selection]) {
    selections.sort_by_key(|s| s.start());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_properties() {
        let sel = Selection::new(Position::new(0, 4), Position::new(0, 1));
        assert!(sel.is_reversed());
        assert!(!sel.is_empty());
        assert_eq!(sel.start(), Position::new(0, 1));
        assert_eq!(sel.end(), Position::new(0, 4));

        assert!(Selection::empty(Position::zero()).is_empty());
    }

    #[test]
    fn test_shifted_shapes() {
        let sel = Selection::new(Position::new(0, 1), Position::new(0, 3));
        let target = Position::new(0, 6);

        assert_eq!(sel.shifted(target, Shift::Jump), Selection::empty(target));
        assert_eq!(
            sel.shifted(target, Shift::Select),
            Selection::new(Position::new(0, 3), target)
        );
        assert_eq!(
            sel.shifted(target, Shift::Extend),
            Selection::new(Position::new(0, 1), target)
        );
    }

    #[test]
    fn test_seek_from_caret_behavior() {
        let doc = Document::from_text("abcdef");
        let sel = Selection::new(Position::new(0, 1), Position::new(0, 4));

        assert_eq!(
            sel.seek_from(&doc, SelectionBehavior::Caret, Direction::Forward),
            sel.active
        );
        assert_eq!(
            sel.seek_from(&doc, SelectionBehavior::Caret, Direction::Backward),
            sel.active
        );
    }

    #[test]
    fn test_seek_from_character_behavior() {
        let doc = Document::from_text("abcdef");

        // A forward-facing selection seeking backward starts before the
        // caret char.
        let forward = Selection::new(Position::new(0, 1), Position::new(0, 4));
        assert_eq!(
            forward.seek_from(&doc, SelectionBehavior::Character, Direction::Backward),
            Position::new(0, 3)
        );
        assert_eq!(
            forward.seek_from(&doc, SelectionBehavior::Character, Direction::Forward),
            Position::new(0, 4)
        );

        // A reversed selection seeking forward starts after the caret char.
        let reversed = Selection::new(Position::new(0, 4), Position::new(0, 1));
        assert_eq!(
            reversed.seek_from(&doc, SelectionBehavior::Character, Direction::Forward),
            Position::new(0, 2)
        );

        // Empty selections are never nudged.
        let empty = Selection::empty(Position::new(0, 2));
        assert_eq!(
            empty.seek_from(&doc, SelectionBehavior::Character, Direction::Backward),
            Position::new(0, 2)
        );
    }

    #[test]
    fn test_text_and_len() {
        let doc = Document::from_text("foo bar\nbaz");
        let sel = Selection::new(Position::new(1, 2), Position::new(0, 4));
        assert_eq!(sel.text(&doc), "bar\nba");
        assert_eq!(sel.len(&doc), 6);
    }
}
