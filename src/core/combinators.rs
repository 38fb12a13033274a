//! Selection-set combinators: rotate, filter, split
//!
//! Pure transformations over a whole selection set. Selection rotations
//! permute the set itself; content rotations produce an edit batch that
//! moves the covered text between selections; filter and split reshape
//! the set from each selection's text.

use regex::Regex;

use crate::core::document::{Document, TextEdit};
use crate::core::error::EngineError;
use crate::core::seek::CharSet;
use crate::core::selection::Selection;

/// Rotate the selection set by `by`: index `i` receives the selection
/// previously at `(i - by) mod len`
pub fn rotate_selections(selections: &[Selection], by: isize) -> Vec<Selection> {
    let len = selections.len();
    if len == 0 {
        return Vec::new();
    }

    (0..len)
        .map(|i| selections[(i as isize - by).rem_euclid(len as isize) as usize])
        .collect()
}

/// The edit batch that rotates selection *contents* by `by`: the text of
/// index `i` is replaced with the text previously at `(i - by) mod len`.
/// Selections themselves are left for the caller to remap through the
/// applied changes.
pub fn rotation_edits(document: &Document, selections: &[Selection], by: isize) -> Vec<TextEdit> {
    let len = selections.len();
    if len == 0 {
        return Vec::new();
    }

    (0..len)
        .map(|i| {
            let source = &selections[(i as isize - by).rem_euclid(len as isize) as usize];
            let target = &selections[i];
            TextEdit::replace(target.start(), target.end(), source.text(document))
        })
        .collect()
}

/// Keep the selections for which `predicate` answers true (or false, with
/// `inverse`). An error from the predicate aborts the whole filter.
pub fn filter<F>(
    document: &Document,
    selections: &[Selection],
    inverse: bool,
    mut predicate: F,
) -> Result<Vec<Selection>, EngineError>
where
    F: FnMut(usize, &Selection, &Document) -> Result<bool, EngineError>,
{
    let mut kept = Vec::new();

    for (index, selection) in selections.iter().enumerate() {
        if predicate(index, selection, document)? != inverse {
            kept.push(*selection);
        }
    }

    Ok(kept)
}

/// Keep the selections whose text matches `pattern` (or does not, with
/// `inverse`)
pub fn filter_regex(
    document: &Document,
    selections: &[Selection],
    pattern: &Regex,
    inverse: bool,
) -> Vec<Selection> {
    selections
        .iter()
        .filter(|s| pattern.is_match(&s.text(document)) != inverse)
        .copied()
        .collect()
}

/// Split every selection on `pattern`, producing one selection per
/// segment between matches
pub fn split(
    document: &Document,
    selections: &[Selection],
    pattern: &Regex,
    exclude_empty: bool,
) -> Vec<Selection> {
    let mut result = Vec::new();

    for selection in selections {
        let base = document.offset_at(selection.start());
        let text = selection.text(document);

        let mut segment_start = 0usize;
        for m in pattern.find_iter(&text) {
            push_segment(
                document,
                &mut result,
                base,
                &text,
                segment_start,
                m.start(),
                exclude_empty,
            );
            segment_start = m.end();
        }
        push_segment(
            document,
            &mut result,
            base,
            &text,
            segment_start,
            text.len(),
            exclude_empty,
        );
    }

    result
}

fn push_segment(
    document: &Document,
    result: &mut Vec<Selection>,
    base: usize,
    text: &str,
    start_byte: usize,
    end_byte: usize,
    exclude_empty: bool,
) {
    if exclude_empty && start_byte == end_byte {
        return;
    }

    let start = base + text[..start_byte].chars().count();
    let end = base + text[..end_byte].chars().count();
    result.push(Selection::from_offsets(document, start, end));
}

/// Split every selection into one selection per spanned line, each
/// clamped to the original bounds
pub fn split_lines(document: &Document, selections: &[Selection]) -> Vec<Selection> {
    let mut result = Vec::new();

    for selection in selections {
        let start = selection.start();
        let end = selection.end();

        for line in start.line..=end.line {
            let from = if line == start.line {
                start
            } else {
                crate::core::position::Position::line_start(line)
            };
            let to = if line == end.line {
                end
            } else {
                crate::core::position::Position::new(line, document.line_len(line))
            };

            if from < to || (from == to && start == end) {
                result.push(Selection::new(from, to));
            }
        }
    }

    result
}

/// Shrink a selection past its leading and trailing whitespace. `None`
/// when it contains only whitespace.
pub fn trim_whitespace(document: &Document, selection: &Selection) -> Option<Selection> {
    let mut start = document.offset_at(selection.start());
    let mut end = document.offset_at(selection.end());

    while start < end && CharSet::Blank.contains(document.char_at(start)?) {
        start += 1;
    }
    while end > start && CharSet::Blank.contains(document.char_at(end - 1)?) {
        end -= 1;
    }

    if start == end {
        return None;
    }

    let trimmed = if selection.is_reversed() {
        Selection::from_offsets(document, end, start)
    } else {
        Selection::from_offsets(document, start, end)
    };

    Some(trimmed)
}
