//! Rotation commands
//!
//! Rotate the selection set, the text the selections cover, or both at
//! once. The count is the rotation amount (default 1); `reverse` rotates
//! the other way.

use crate::core::combinators;
use crate::core::command::{DispatchResult, RawArgs};
use crate::core::context::Context;
use crate::core::error::EngineError;
use crate::core::update::{self, EmptyPolicy};

fn rotation(args: &mut RawArgs) -> isize {
    let by = args.repetitions() as isize;
    if args.reverse.unwrap_or(false) {
        -by
    } else {
        by
    }
}

/// `selections.rotate.selections`: rotate the selection set without
/// touching the text
pub fn selections(ctx: &mut Context<'_>, args: &mut RawArgs) -> Result<DispatchResult, EngineError> {
    let by = rotation(args);

    let parts = ctx.parts()?;
    update::update_all(
        parts.selections,
        parts.document,
        EmptyPolicy::Reject,
        |all, _| Ok(combinators::rotate_selections(all, by)),
    )?;

    Ok(DispatchResult::Done)
}

/// `selections.rotate.contents`: rotate the text the selections cover.
///
/// The selections stay in place, each ending up covering the text that
/// rotated into it.
pub fn contents(ctx: &mut Context<'_>, args: &mut RawArgs) -> Result<DispatchResult, EngineError> {
    let by = rotation(args);
    rotate_contents(ctx, by)?;
    Ok(DispatchResult::Done)
}

/// `selections.rotate.both`: rotate the covered text and the selection
/// order together
pub fn both(ctx: &mut Context<'_>, args: &mut RawArgs) -> Result<DispatchResult, EngineError> {
    let by = rotation(args);
    rotate_contents(ctx, by)?;

    let parts = ctx.parts()?;
    update::update_all(
        parts.selections,
        parts.document,
        EmptyPolicy::Reject,
        |all, _| Ok(combinators::rotate_selections(all, by)),
    )?;

    Ok(DispatchResult::Done)
}

fn rotate_contents(ctx: &mut Context<'_>, by: isize) -> Result<(), EngineError> {
    let edits = {
        let parts = ctx.parts()?;
        combinators::rotation_edits(parts.document, parts.selections, by)
    };
    ctx.apply_edit(&edits)
}
