//! Selection set commands: save, restore, filter, split, trim
//!
//! The save/restore pair moves selection snapshots through registers; the
//! others reshape the live set through the selection update engine,
//! prompting for a regular expression when none was given.

use regex::Regex;

use crate::core::combinators;
use crate::core::command::{DispatchResult, RawArgs};
use crate::core::context::Context;
use crate::core::error::EngineError;
use crate::core::prompt::{InputRequest, PromptRequest, Validator};
use crate::core::register::{self, RegisterFlags};
use crate::core::update::{self, EmptyPolicy};

fn regex_prompt(prompt: &str, history_key: &str) -> DispatchResult {
    DispatchResult::NeedsInput(PromptRequest::Input(InputRequest {
        prompt: prompt.to_string(),
        value: None,
        history_key: Some(history_key.to_string()),
        validator: Validator::Regexp,
    }))
}

fn parse_regex(input: &str) -> Result<Regex, EngineError> {
    Regex::new(input).map_err(|e| EngineError::argument("input", e.to_string()))
}

/// `selections.save`: store the selection set into a register
/// (`caret` by default)
pub fn save(ctx: &mut Context<'_>, args: &mut RawArgs) -> Result<DispatchResult, EngineError> {
    let selections = ctx.parts()?.selections.clone();

    let slot = ctx.engine.resolve_register(
        args,
        register::CARET,
        RegisterFlags::CAN_WRITE_SELECTIONS,
        "write selections",
    )?;
    ctx.engine.register_mut(&slot).set_selections(selections)?;

    Ok(DispatchResult::Done)
}

/// `selections.restore`: replace the selection set with a register's
/// snapshot
pub fn restore(ctx: &mut Context<'_>, args: &mut RawArgs) -> Result<DispatchResult, EngineError> {
    let slot = ctx.engine.resolve_register(
        args,
        register::CARET,
        RegisterFlags::CAN_READ_SELECTIONS,
        "read selections",
    )?;
    let selections = ctx.engine.register_mut(&slot).selections()?.to_vec();
    EngineError::validate("register", !selections.is_empty(), "no selections to restore")?;

    let editor = ctx.editor_id()?;
    ctx.engine.set_selections(editor, selections)?;

    Ok(DispatchResult::Done)
}

/// `selections.save_text`: store the text of each selection into a
/// register (`dquote` by default)
pub fn save_text(ctx: &mut Context<'_>, args: &mut RawArgs) -> Result<DispatchResult, EngineError> {
    let texts = {
        let parts = ctx.parts()?;
        parts
            .selections
            .iter()
            .map(|s| s.text(parts.document))
            .collect::<Vec<_>>()
    };

    let slot = ctx.engine.resolve_register(
        args,
        register::DQUOTE,
        RegisterFlags::CAN_WRITE,
        "write text",
    )?;
    ctx.engine.register_mut(&slot).set_text(texts)?;

    Ok(DispatchResult::Done)
}

/// `selections.filter`: keep the selections whose text matches a regular
/// expression (or does not, with `inverse`)
pub fn filter(ctx: &mut Context<'_>, args: &mut RawArgs) -> Result<DispatchResult, EngineError> {
    let input = match args.input() {
        Some(input) => input.to_string(),
        None => return Ok(regex_prompt("Keep selections matching", "filter")),
    };
    let pattern = parse_regex(&input)?;
    let inverse = args.inverse.unwrap_or(false);

    let parts = ctx.parts()?;
    update::update_all(
        parts.selections,
        parts.document,
        EmptyPolicy::Reject,
        |all, document| Ok(combinators::filter_regex(document, all, &pattern, inverse)),
    )?;

    Ok(DispatchResult::Done)
}

/// `selections.split`: split each selection on a regular expression,
/// keeping the segments between matches
pub fn split(ctx: &mut Context<'_>, args: &mut RawArgs) -> Result<DispatchResult, EngineError> {
    let input = match args.input() {
        Some(input) => input.to_string(),
        None => return Ok(regex_prompt("Split on", "split")),
    };
    let pattern = parse_regex(&input)?;
    let exclude_empty = args.exclude_empty.unwrap_or(false);

    let parts = ctx.parts()?;
    update::update_all(
        parts.selections,
        parts.document,
        EmptyPolicy::Reject,
        |all, document| Ok(combinators::split(document, all, &pattern, exclude_empty)),
    )?;

    Ok(DispatchResult::Done)
}

/// `selections.split_lines`: split each selection into one selection per
/// spanned line
pub fn split_lines(
    ctx: &mut Context<'_>,
    _args: &mut RawArgs,
) -> Result<DispatchResult, EngineError> {
    let parts = ctx.parts()?;
    update::update_all(
        parts.selections,
        parts.document,
        EmptyPolicy::Reject,
        |all, document| Ok(combinators::split_lines(document, all)),
    )?;

    Ok(DispatchResult::Done)
}

/// `selections.trim_whitespace`: shrink each selection past its leading
/// and trailing whitespace, dropping all-blank selections
pub fn trim_whitespace(
    ctx: &mut Context<'_>,
    _args: &mut RawArgs,
) -> Result<DispatchResult, EngineError> {
    let parts = ctx.parts()?;
    update::update_by_index(
        parts.selections,
        parts.document,
        EmptyPolicy::Reject,
        |_, selection, document| Ok(combinators::trim_whitespace(document, selection)),
    )?;

    Ok(DispatchResult::Done)
}
