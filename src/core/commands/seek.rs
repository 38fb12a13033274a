//! Per-selection motion commands
//!
//! Thin wrappers that resolve arguments, prompt for missing input, and
//! funnel the motion primitives through the selection update engine.

use crate::core::command::{DispatchResult, RawArgs};
use crate::core::context::Context;
use crate::core::error::EngineError;
use crate::core::prompt::PromptRequest;
use crate::core::seek;
use crate::core::selection::{Direction, Shift};
use crate::core::update::{self, EmptyPolicy};

/// `seek.character`: select until the next occurrence of a character.
///
/// Prompts for a keypress when no input was given. Selections for which
/// the character does not occur are dropped; if that drops every
/// selection, the command fails and the prior set is kept.
pub fn character(ctx: &mut Context<'_>, args: &mut RawArgs) -> Result<DispatchResult, EngineError> {
    let target = match args.input() {
        Some(input) => input.to_string(),
        None => return Ok(DispatchResult::NeedsInput(PromptRequest::Keypress)),
    };
    EngineError::validate("input", !target.is_empty(), "a character must be given")?;

    let repetitions = args.repetitions();
    let direction = args.direction(Direction::Forward)?;
    let shift = args.shift(Shift::Select)?;
    let include = args.include.unwrap_or(false);

    let parts = ctx.parts()?;
    let behavior = parts.behavior;
    update::update_by_index(
        parts.selections,
        parts.document,
        EmptyPolicy::Reject,
        |_, selection, document| {
            Ok(seek::character(
                document, selection, behavior, &target, direction, shift, include, repetitions,
            ))
        },
    )?;

    Ok(DispatchResult::Done)
}

/// `seek.word`: move each selection over the next or previous word.
///
/// `ws` switches to the non-blank charset, `stop_at_end` stops at word
/// ends instead of the next word start.
pub fn word(ctx: &mut Context<'_>, args: &mut RawArgs) -> Result<DispatchResult, EngineError> {
    let repetitions = args.repetitions();
    let direction = args.direction(Direction::Forward)?;
    let shift = args.shift(Shift::Select)?;
    let stop_at_end = args.stop_at_end.unwrap_or(false);
    let charset = if args.ws.unwrap_or(false) {
        seek::CharSet::NonBlank
    } else {
        seek::CharSet::Word
    };

    let parts = ctx.parts()?;
    update::update_by_index(
        parts.selections,
        parts.document,
        EmptyPolicy::Reject,
        |_, selection, document| {
            Ok(seek::word(
                document, selection, repetitions, stop_at_end, charset, direction, shift,
            ))
        },
    )?;

    Ok(DispatchResult::Done)
}

/// `seek.enclosing`: jump to the enclosing pair character.
///
/// Pairs come from the `pairs` argument or the engine defaults; `open`
/// puts the active end on the opening token.
pub fn enclosing(ctx: &mut Context<'_>, args: &mut RawArgs) -> Result<DispatchResult, EngineError> {
    let direction = args.direction(Direction::Forward)?;
    let shift = args.shift(Shift::Select)?;
    let open = args.open.unwrap_or(true);

    let patterns = match &args.pairs {
        Some(patterns) => patterns.clone(),
        None => ctx.engine.options.enclosing_pairs.clone(),
    };
    let pairs = seek::compile_pairs(&patterns)?;

    let parts = ctx.parts()?;
    let behavior = parts.behavior;
    update::update_by_index(
        parts.selections,
        parts.document,
        EmptyPolicy::Reject,
        |_, selection, document| {
            Ok(seek::enclosing(
                document, selection, behavior, direction, shift, open, &pairs,
            ))
        },
    )?;

    Ok(DispatchResult::Done)
}
