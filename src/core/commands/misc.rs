//! Dispatch plumbing commands
//!
//! Cancellation, count and register composition, mode switching, and
//! menus. The composition commands are flagged `DO_NOT_RECORD`: they fold
//! into the next recorded dispatch instead of appearing in history and
//! macros themselves.

use crate::core::command::{DispatchResult, RawArgs};
use crate::core::context::Context;
use crate::core::error::{CancellationReason, EngineError};
use crate::core::prompt::{InputRequest, MenuRequest, PromptRequest, Validator};

/// `cancel`: tear down the operation underway.
///
/// Fires the cancellation token, dismisses any active prompt, and clears
/// the pending count and register.
pub fn cancel(ctx: &mut Context<'_>, _args: &mut RawArgs) -> Result<DispatchResult, EngineError> {
    ctx.engine
        .cancel_current(CancellationReason::CancellationToken);
    Ok(DispatchResult::Done)
}

/// `count.update`: append a digit to the pending count.
///
/// The composed count is folded into the next recorded dispatch that did
/// not get an explicit count.
pub fn update_count(
    ctx: &mut Context<'_>,
    args: &mut RawArgs,
) -> Result<DispatchResult, EngineError> {
    let digit = args.count();
    EngineError::validate("count", digit <= 9, "expected a single digit")?;

    // Saturate rather than overflow: hosts may forward any number of
    // digit presses.
    ctx.engine.pending_count = ctx
        .engine
        .pending_count
        .saturating_mul(10)
        .saturating_add(digit);
    Ok(DispatchResult::Done)
}

/// `register.select`: pick the register for the next recorded dispatch.
///
/// Prompts for a keypress when no input was given; a leading space in the
/// name addresses the document scope.
pub fn select_register(
    ctx: &mut Context<'_>,
    args: &mut RawArgs,
) -> Result<DispatchResult, EngineError> {
    let name = match args.input() {
        Some(input) => input.to_string(),
        None => return Ok(DispatchResult::NeedsInput(PromptRequest::Keypress)),
    };
    EngineError::validate("input", !name.trim().is_empty(), "a register name must be given")?;

    ctx.engine.pending_register = Some(name);
    Ok(DispatchResult::Done)
}

/// `modes.set`: switch the targeted editor to a mode, prompting for the
/// mode name when none was given
pub fn set_mode(ctx: &mut Context<'_>, args: &mut RawArgs) -> Result<DispatchResult, EngineError> {
    let mode = match args.input() {
        Some(input) => input.to_string(),
        None => {
            return Ok(DispatchResult::NeedsInput(PromptRequest::Input(
                InputRequest {
                    prompt: "Mode".to_string(),
                    value: None,
                    history_key: None,
                    validator: Validator::NonEmpty,
                },
            )))
        }
    };

    let editor = ctx.editor_id()?;
    ctx.engine.set_mode(editor, &mode)?;
    Ok(DispatchResult::Done)
}

/// `menu.open`: show a menu of commands and dispatch the picked one.
///
/// Item labels are command identifiers; the picked label is dispatched
/// with default arguments.
pub fn open_menu(ctx: &mut Context<'_>, args: &mut RawArgs) -> Result<DispatchResult, EngineError> {
    let picked = match args.input() {
        Some(input) => input.to_string(),
        None => {
            let items = args.items.clone().unwrap_or_default();
            EngineError::validate("items", !items.is_empty(), "a menu needs at least one item")?;

            return Ok(DispatchResult::NeedsInput(PromptRequest::Menu(
                MenuRequest {
                    title: "Commands".to_string(),
                    items,
                },
            )));
        }
    };

    ctx.engine.dispatch_nested(&picked, RawArgs::default())?;
    Ok(DispatchResult::Done)
}
