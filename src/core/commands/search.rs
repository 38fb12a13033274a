//! Regex search
//!
//! `search` prompts for a regular expression (shared history under the
//! `"search"` key), stores the accepted pattern into the `slash` register,
//! and moves each selection to the nearest match in the given direction.

use regex::Regex;

use crate::core::command::{DispatchResult, RawArgs};
use crate::core::context::Context;
use crate::core::document::Document;
use crate::core::error::EngineError;
use crate::core::prompt::{InputRequest, PromptRequest, Validator};
use crate::core::register::{self, RegisterFlags};
use crate::core::selection::{Direction, Selection, Shift};
use crate::core::update::{self, EmptyPolicy};

/// `search`: select the next (or previous) match of a regular expression.
///
/// Forward takes the first match starting after the selection's active
/// end, backward the last match starting before it. Selections without a
/// match in their direction are dropped; dropping them all fails the
/// command and keeps the prior set.
pub fn search(ctx: &mut Context<'_>, args: &mut RawArgs) -> Result<DispatchResult, EngineError> {
    let input = match args.input() {
        Some(input) => input.to_string(),
        None => {
            return Ok(DispatchResult::NeedsInput(PromptRequest::Input(
                InputRequest {
                    prompt: "Search".to_string(),
                    value: None,
                    history_key: Some("search".to_string()),
                    validator: Validator::Regexp,
                },
            )))
        }
    };
    let pattern = Regex::new(&input).map_err(|e| EngineError::argument("input", e.to_string()))?;

    let direction = args.direction(Direction::Forward)?;
    let shift = args.shift(Shift::Select)?;

    let slot = ctx.engine.resolve_register(
        args,
        register::SLASH,
        RegisterFlags::CAN_WRITE,
        "write text",
    )?;
    ctx.engine.register_mut(&slot).set_text(vec![input])?;

    let parts = ctx.parts()?;
    let matches = collect_matches(parts.document, &pattern);

    update::update_by_index(
        parts.selections,
        parts.document,
        EmptyPolicy::Reject,
        |_, selection, document| Ok(seek_match(document, selection, &matches, direction, shift)),
    )?;

    Ok(DispatchResult::Done)
}

/// All matches of `pattern`, as char offset ranges
fn collect_matches(document: &Document, pattern: &Regex) -> Vec<(usize, usize)> {
    let text = document.text();
    pattern
        .find_iter(&text)
        .map(|m| {
            (
                text[..m.start()].chars().count(),
                text[..m.end()].chars().count(),
            )
        })
        .collect()
}

fn seek_match(
    document: &Document,
    selection: &Selection,
    matches: &[(usize, usize)],
    direction: Direction,
    shift: Shift,
) -> Option<Selection> {
    let from = document.offset_at(selection.active);

    let &(start, end) = match direction {
        Direction::Forward => matches.iter().find(|&&(start, _)| start > from)?,
        Direction::Backward => matches.iter().rev().find(|&&(start, _)| start < from)?,
    };

    // The active end faces the motion direction.
    let (anchor, active) = match direction {
        Direction::Forward => (start, end),
        Direction::Backward => (end, start),
    };

    match shift {
        Shift::Jump => Some(Selection::empty(document.position_at(active))),
        Shift::Select => Some(Selection::from_offsets(document, anchor, active)),
        Shift::Extend => Some(Selection::new(
            selection.anchor,
            document.position_at(active),
        )),
    }
}
