//! Movement and seek primitives
//!
//! Per-selection motions in the Kakoune family: seek to a character, walk
//! word boundaries, and jump between enclosing pair characters. Each
//! function maps one selection to its moved form (or `None` when the
//! motion fails), so commands plug them straight into the selection update
//! engine.

use regex::{Regex, RegexBuilder};

use crate::core::document::Document;
use crate::core::error::EngineError;
use crate::core::position::{self, Position};
use crate::core::selection::{Direction, Selection, SelectionBehavior, Shift};

// =============================================================================
// CHARACTER CLASSIFICATION
// =============================================================================

/// Character sets used by word motions and whitespace trimming
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharSet {
    /// Identifier characters: alphanumerics and underscore
    Word,
    /// Anything that is not whitespace
    NonBlank,
    /// Whitespace, including line breaks
    Blank,
}

impl CharSet {
    /// True when `c` belongs to this set
    pub fn contains(self, c: char) -> bool {
        match self {
            CharSet::Word => c.is_alphanumeric() || c == '_',
            CharSet::NonBlank => !c.is_whitespace(),
            CharSet::Blank => c.is_whitespace(),
        }
    }
}

/// Category a char falls into while walking word boundaries. With the
/// `Word` charset, punctuation forms its own runs; with `NonBlank`
/// everything that is not whitespace is one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Category {
    Word,
    Punctuation,
    Blank,
}

fn categorize(c: char, charset: CharSet) -> Category {
    if c.is_whitespace() {
        Category::Blank
    } else if charset != CharSet::Word || CharSet::Word.contains(c) {
        Category::Word
    } else {
        Category::Punctuation
    }
}

// =============================================================================
// CHARACTER SEEK
// =============================================================================

/// Seek each selection to the next occurrence of `target`.
///
/// The search starts from the selection's seek point, advanced by one char
/// so that repeated invocations make progress. The landing position
/// excludes the target; `include` then extends over it. Fails (dropping
/// the selection) when `target` does not occur within the remaining
/// repetitions.
pub fn character(
    document: &Document,
    selection: &Selection,
    behavior: SelectionBehavior,
    target: &str,
    direction: Direction,
    shift: Shift,
    include: bool,
    repetitions: usize,
) -> Option<Selection> {
    let needle: Vec<char> = target.chars().collect();
    if needle.is_empty() {
        return None;
    }

    let mut pos = selection.seek_from(document, behavior, direction);

    for _ in 0..repetitions {
        pos = position::offset(document, pos, direction.delta())?;
        let from = document.offset_at(pos);

        let landing = match direction {
            Direction::Forward => find_forward(document, &needle, from)?,
            Direction::Backward => find_backward(document, &needle, from)? + needle.len(),
        };

        pos = document.position_at(landing);
    }

    if include {
        pos = position::offset(document, pos, needle.len() as isize * direction.delta())?;
    }

    Some(selection.shifted(pos, shift))
}

/// Start offset of the first occurrence of `needle` at or after `from`
fn find_forward(document: &Document, needle: &[char], from: usize) -> Option<usize> {
    let len = document.len_chars();
    let mut start = from;

    while start + needle.len() <= len {
        if matches_at(document, needle, start) {
            return Some(start);
        }
        start += 1;
    }

    None
}

/// Start offset of the last occurrence of `needle` ending at or before
/// `until`
fn find_backward(document: &Document, needle: &[char], until: usize) -> Option<usize> {
    if until < needle.len() {
        return None;
    }

    let mut start = until - needle.len();
    loop {
        if matches_at(document, needle, start) {
            return Some(start);
        }
        if start == 0 {
            return None;
        }
        start -= 1;
    }
}

fn matches_at(document: &Document, needle: &[char], start: usize) -> bool {
    needle
        .iter()
        .enumerate()
        .all(|(k, &c)| document.char_at(start + k) == Some(c))
}

// =============================================================================
// WORD MOTION
// =============================================================================

/// One word-boundary step from `active`.
///
/// Forward without `stop_at_end` lands on the next word start (consuming
/// the current run and any following blanks); with `stop_at_end` it lands
/// just past the next word end. Backward lands on the previous word start.
/// Returns the spanned selection, anchored at `active`. `None` when the
/// motion would overflow the document.
pub fn word_boundary(
    document: &Document,
    active: Position,
    direction: Direction,
    stop_at_end: bool,
    charset: CharSet,
) -> Option<Selection> {
    let len = document.len_chars();
    let mut o = document.offset_at(active);

    let cat_at = |offset: usize| -> Option<Category> {
        document.char_at(offset).map(|c| categorize(c, charset))
    };

    match direction {
        Direction::Forward => {
            if o >= len {
                return None;
            }

            if stop_at_end {
                while cat_at(o) == Some(Category::Blank) {
                    o += 1;
                }
                let cat = cat_at(o)?;
                while cat_at(o) == Some(cat) {
                    o += 1;
                }
            } else {
                let cat = cat_at(o)?;
                if cat != Category::Blank {
                    while cat_at(o) == Some(cat) {
                        o += 1;
                    }
                }
                while cat_at(o) == Some(Category::Blank) {
                    o += 1;
                }
            }

            Some(Selection::new(active, document.position_at(o)))
        }
        Direction::Backward => {
            if o == 0 {
                return None;
            }

            while o > 0 && cat_at(o - 1) == Some(Category::Blank) {
                o -= 1;
            }
            if o == 0 {
                return None;
            }

            let cat = cat_at(o - 1)?;
            while o > 0 && cat_at(o - 1) == Some(cat) {
                o -= 1;
            }
            if o == 0 {
                // Reaching the document start counts as an overflow, like
                // in Kakoune. Callers substitute the special first-line
                // selection.
                return None;
            }

            Some(Selection::new(active, document.position_at(o)))
        }
    }
}

/// Repeat a word-boundary motion and shape the result.
///
/// Mimics the Kakoune special case for backward overflow: instead of
/// failing, a backward motion from below the first line yields the
/// selection from the document start to the start of the second line.
pub fn word(
    document: &Document,
    selection: &Selection,
    repetitions: usize,
    stop_at_end: bool,
    charset: CharSet,
    direction: Direction,
    shift: Shift,
) -> Option<Selection> {
    let anchor = selection.anchor;
    let mut current = *selection;

    for _ in 0..repetitions {
        match word_boundary(document, current.active, direction, stop_at_end, charset) {
            Some(mapped) => current = mapped,
            None => {
                if direction == Direction::Backward
                    && current.active.line > 0
                    && document.line_count() > 1
                {
                    return Some(Selection::new(Position::zero(), Position::line_start(1)));
                }

                return None;
            }
        }
    }

    if shift == Shift::Extend {
        Some(Selection::new(anchor, current.active))
    } else {
        Some(current)
    }
}

// =============================================================================
// ENCLOSING PAIRS
// =============================================================================

/// A compiled open/close pattern pair
#[derive(Debug, Clone)]
pub struct Pair {
    /// Pattern matching the opening token
    pub open: Regex,
    /// Pattern matching the closing token
    pub close: Regex,
}

/// Compile a flat open/close pattern list into pairs.
///
/// The list length must be even; patterns are compiled in multi-line
/// Unicode mode.
pub fn compile_pairs(patterns: &[String]) -> Result<Vec<Pair>, EngineError> {
    EngineError::validate(
        "pairs",
        patterns.len() % 2 == 0,
        "an even number of pairs must be given",
    )?;

    let mut pairs = Vec::with_capacity(patterns.len() / 2);

    for chunk in patterns.chunks_exact(2) {
        let compile = |pattern: &str| {
            RegexBuilder::new(pattern)
                .multi_line(true)
                .build()
                .map_err(|e| EngineError::argument("pairs", e.to_string()))
        };

        pairs.push(Pair {
            open: compile(&chunk[0])?,
            close: compile(&chunk[1])?,
        });
    }

    Ok(pairs)
}

#[derive(Debug, Clone, Copy)]
struct PairToken {
    start: usize,
    end: usize,
    pair: usize,
    is_open: bool,
}

/// Seek to the nearest enclosing pair character and its matching
/// counterpart.
///
/// The repetition count is deliberately not a parameter: like in Kakoune,
/// running the motion again jumps back and forth between the pair ends
/// instead of walking outward. With caret behavior the starting character
/// is peeked one position back in two cases so that a selection sitting
/// just inside a group jumps within that group rather than escaping it.
pub fn enclosing(
    document: &Document,
    selection: &Selection,
    behavior: SelectionBehavior,
    direction: Direction,
    shift: Shift,
    open: bool,
    pairs: &[Pair],
) -> Option<Selection> {
    let mut current = selection.active;

    if behavior == SelectionBehavior::Caret {
        if direction == Direction::Backward && selection.is_reversed() {
            // The first character to consider is the one to the left, and
            // a reversed selection already points between characters.
            current = position::previous(document, current).unwrap_or(current);
        } else if direction == Direction::Forward
            && !selection.is_reversed()
            && !selection.is_empty()
        {
            // A forward selection ending just after a closing character
            // should jump back within its own group.
            current = position::previous(document, current).unwrap_or(current);
        }

        if direction == Direction::Backward {
            current = position::previous(document, current).unwrap_or(current);
        }
    }

    let range = surrounded_by(document, pairs, direction, current, open)?;

    if shift == Shift::Extend {
        Some(Selection::new(selection.anchor, range.active))
    } else {
        Some(range)
    }
}

/// Find the pair range around or beyond `from` in `direction`.
///
/// The nearest pair token in the given direction is located first (a token
/// under `from` counts), then its counterpart is found by balance
/// counting. When `open` the returned selection's active end sits on the
/// opening token, otherwise on the closing token.
fn surrounded_by(
    document: &Document,
    pairs: &[Pair],
    direction: Direction,
    from: Position,
    open: bool,
) -> Option<Selection> {
    let tokens = tokenize(document, pairs);
    let from = document.offset_at(from);

    let candidate = match direction {
        Direction::Forward => tokens.iter().position(|t| t.end > from)?,
        Direction::Backward => tokens.iter().rposition(|t| t.start <= from)?,
    };

    let (open_token, close_token) = if tokens[candidate].is_open {
        let close = match_forward(&tokens, candidate)?;
        (tokens[candidate], close)
    } else {
        let open_t = match_backward(&tokens, candidate)?;
        (open_t, tokens[candidate])
    };

    let open_pos = document.position_at(open_token.start);
    let close_pos = document.position_at(close_token.end);

    if open {
        Some(Selection::new(close_pos, open_pos))
    } else {
        Some(Selection::new(open_pos, close_pos))
    }
}

/// All pair tokens of the document, sorted by start offset
fn tokenize(document: &Document, pairs: &[Pair]) -> Vec<PairToken> {
    let text = document.text();
    let mut tokens = Vec::new();

    for (index, pair) in pairs.iter().enumerate() {
        for m in pair.open.find_iter(&text) {
            tokens.push(PairToken {
                start: byte_to_char(&text, m.start()),
                end: byte_to_char(&text, m.end()),
                pair: index,
                is_open: true,
            });
        }

        // Identical open and close patterns would produce duplicate
        // tokens; keep only the open ones in that case.
        if pair.open.as_str() == pair.close.as_str() {
            continue;
        }

        for m in pair.close.find_iter(&text) {
            tokens.push(PairToken {
                start: byte_to_char(&text, m.start()),
                end: byte_to_char(&text, m.end()),
                pair: index,
                is_open: false,
            });
        }
    }

    tokens.sort_by_key(|t| (t.start, t.end));
    tokens
}

fn match_forward(tokens: &[PairToken], at: usize) -> Option<PairToken> {
    let pair = tokens[at].pair;
    let mut depth = 0isize;

    for token in &tokens[at..] {
        if token.pair != pair {
            continue;
        }

        if token.is_open {
            depth += 1;
        } else {
            depth -= 1;
            if depth == 0 {
                return Some(*token);
            }
        }
    }

    None
}

fn match_backward(tokens: &[PairToken], at: usize) -> Option<PairToken> {
    let pair = tokens[at].pair;
    let mut depth = 0isize;

    for token in tokens[..=at].iter().rev() {
        if token.pair != pair {
            continue;
        }

        if token.is_open {
            depth -= 1;
            if depth == 0 {
                return Some(*token);
            }
        } else {
            depth += 1;
        }
    }

    None
}

fn byte_to_char(text: &str, byte: usize) -> usize {
    text[..byte].chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caret() -> SelectionBehavior {
        SelectionBehavior::Caret
    }

    #[test]
    fn test_character_forward_excluded_and_included() {
        let doc = Document::from_text("say hello");
        let sel = Selection::empty(Position::new(0, 0));

        let moved = character(
            &doc,
            &sel,
            caret(),
            "l",
            Direction::Forward,
            Shift::Select,
            false,
            1,
        )
        .unwrap();
        assert_eq!(moved.active, Position::new(0, 6));

        let included = character(
            &doc,
            &sel,
            caret(),
            "l",
            Direction::Forward,
            Shift::Select,
            true,
            1,
        )
        .unwrap();
        assert_eq!(included.active, Position::new(0, 7));
    }

    #[test]
    fn test_character_repetitions_and_failure() {
        let doc = Document::from_text("say hello");
        let sel = Selection::empty(Position::new(0, 0));

        let second = character(
            &doc,
            &sel,
            caret(),
            "l",
            Direction::Forward,
            Shift::Select,
            false,
            2,
        )
        .unwrap();
        assert_eq!(second.active, Position::new(0, 7));

        assert!(character(
            &doc,
            &sel,
            caret(),
            "z",
            Direction::Forward,
            Shift::Select,
            false,
            1,
        )
        .is_none());
    }

    #[test]
    fn test_character_backward_lands_after_target() {
        let doc = Document::from_text("say hello");
        let sel = Selection::empty(Position::new(0, 8));

        let moved = character(
            &doc,
            &sel,
            caret(),
            "a",
            Direction::Backward,
            Shift::Select,
            false,
            1,
        )
        .unwrap();
        assert_eq!(moved.active, Position::new(0, 2));

        let included = character(
            &doc,
            &sel,
            caret(),
            "a",
            Direction::Backward,
            Shift::Select,
            true,
            1,
        )
        .unwrap();
        assert_eq!(included.active, Position::new(0, 1));
    }

    #[test]
    fn test_word_forward_to_next_start() {
        let doc = Document::from_text("foo  bar!baz");
        let sel = Selection::empty(Position::new(0, 0));

        let moved = word(
            &doc,
            &sel,
            1,
            false,
            CharSet::Word,
            Direction::Forward,
            Shift::Select,
        )
        .unwrap();
        // Consumes "foo" and the blanks after it.
        assert_eq!(moved.anchor, Position::new(0, 0));
        assert_eq!(moved.active, Position::new(0, 5));

        // Punctuation is its own run under the word charset.
        let from_bar = word(
            &doc,
            &Selection::empty(Position::new(0, 5)),
            1,
            false,
            CharSet::Word,
            Direction::Forward,
            Shift::Select,
        )
        .unwrap();
        assert_eq!(from_bar.active, Position::new(0, 8));
    }

    #[test]
    fn test_word_non_blank_charset_skips_punctuation() {
        let doc = Document::from_text("foo  bar!baz quux");
        let moved = word(
            &doc,
            &Selection::empty(Position::new(0, 5)),
            1,
            false,
            CharSet::NonBlank,
            Direction::Forward,
            Shift::Select,
        )
        .unwrap();
        assert_eq!(moved.active, Position::new(0, 13));
    }

    #[test]
    fn test_word_end_motion() {
        let doc = Document::from_text("foo  bar");
        let moved = word(
            &doc,
            &Selection::empty(Position::new(0, 3)),
            1,
            true,
            CharSet::Word,
            Direction::Forward,
            Shift::Select,
        )
        .unwrap();
        assert_eq!(moved.active, Position::new(0, 8));
    }

    #[test]
    fn test_word_backward_overflow_special_case() {
        let doc = Document::from_text("foo\nbar");
        let sel = Selection::empty(Position::new(1, 1));

        // Two backward steps overflow past the document start; the result
        // is the first-line selection instead of a failure.
        let moved = word(
            &doc,
            &sel,
            2,
            false,
            CharSet::Word,
            Direction::Backward,
            Shift::Select,
        )
        .unwrap();
        assert_eq!(moved.anchor, Position::zero());
        assert_eq!(moved.active, Position::line_start(1));

        // On the first line the overflow is a plain failure.
        let first_line = Selection::empty(Position::new(0, 2));
        assert!(word(
            &doc,
            &first_line,
            1,
            false,
            CharSet::Word,
            Direction::Backward,
            Shift::Select,
        )
        .is_none());
    }

    #[test]
    fn test_word_extend_keeps_anchor() {
        let doc = Document::from_text("foo bar baz");
        let sel = Selection::new(Position::new(0, 1), Position::new(0, 2));

        let moved = word(
            &doc,
            &sel,
            2,
            false,
            CharSet::Word,
            Direction::Forward,
            Shift::Extend,
        )
        .unwrap();
        assert_eq!(moved.anchor, Position::new(0, 1));
        assert_eq!(moved.active, Position::new(0, 8));
    }

    #[test]
    fn test_compile_pairs_validates_length() {
        let err = compile_pairs(&["\\[".to_string()]).unwrap_err();
        assert!(matches!(err, EngineError::Argument { argument: "pairs", .. }));

        assert_eq!(
            compile_pairs(&["\\[".to_string(), "\\]".to_string()])
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_enclosing_finds_matching_counterpart() {
        let doc = Document::from_text("a (b [c] d) e");
        let pairs = compile_pairs(&[
            "\\(".to_string(),
            "\\)".to_string(),
            "\\[".to_string(),
            "\\]".to_string(),
        ])
        .unwrap();

        // From inside the parens, forward finds the bracket pair first.
        let sel = Selection::empty(Position::new(0, 4));
        let moved = enclosing(
            &doc,
            &sel,
            caret(),
            Direction::Forward,
            Shift::Select,
            true,
            &pairs,
        )
        .unwrap();
        assert_eq!(moved.active, Position::new(0, 5));
        assert_eq!(moved.anchor, Position::new(0, 8));
    }

    #[test]
    fn test_enclosing_nested_balance() {
        let doc = Document::from_text("((x))");
        let pairs = compile_pairs(&["\\(".to_string(), "\\)".to_string()]).unwrap();

        // The outer open token matches the outer close token.
        let sel = Selection::empty(Position::new(0, 0));
        let moved = enclosing(
            &doc,
            &sel,
            caret(),
            Direction::Forward,
            Shift::Select,
            false,
            &pairs,
        )
        .unwrap();
        assert_eq!(moved.anchor, Position::new(0, 0));
        assert_eq!(moved.active, Position::new(0, 5));
    }

    #[test]
    fn test_enclosing_backward_peek_in_caret_mode() {
        let doc = Document::from_text("(ab)");
        let pairs = compile_pairs(&["\\(".to_string(), "\\)".to_string()]).unwrap();

        // Backward from just after the close paren considers the char to
        // the left, so the close token itself is found.
        let sel = Selection::empty(Position::new(0, 4));
        let moved = enclosing(
            &doc,
            &sel,
            caret(),
            Direction::Backward,
            Shift::Select,
            true,
            &pairs,
        )
        .unwrap();
        assert_eq!(moved.active, Position::new(0, 0));
        assert_eq!(moved.anchor, Position::new(0, 4));
    }
}
