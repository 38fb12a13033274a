//! Editing commands: insert register text, delete selected text
//!
//! Both build one atomic edit batch over the whole selection set, so a
//! single undo reverts the whole command and the selections of every
//! editor on the document are remapped together.

use crate::core::command::{DispatchResult, RawArgs};
use crate::core::context::Context;
use crate::core::document::TextEdit;
use crate::core::error::EngineError;
use crate::core::register::{self, RegisterFlags};

/// `edit.insert`: replace each selection's text with the corresponding
/// register string (`dquote` by default).
///
/// Register strings are reused cyclically across selection indices; an
/// empty register (notably `underscore`) inserts nothing, which makes
/// this a deletion.
pub fn insert(ctx: &mut Context<'_>, args: &mut RawArgs) -> Result<DispatchResult, EngineError> {
    let slot = ctx.engine.resolve_register(
        args,
        register::DQUOTE,
        RegisterFlags::CAN_READ,
        "read text",
    )?;
    let texts = ctx.engine.register_mut(&slot).text()?.to_vec();

    replace_selections(ctx, &texts)?;
    Ok(DispatchResult::Done)
}

/// `edit.delete`: delete the text each selection covers
pub fn delete(ctx: &mut Context<'_>, _args: &mut RawArgs) -> Result<DispatchResult, EngineError> {
    replace_selections(ctx, &[])?;
    Ok(DispatchResult::Done)
}

fn replace_selections(ctx: &mut Context<'_>, texts: &[String]) -> Result<(), EngineError> {
    let edits = {
        let parts = ctx.parts()?;
        parts
            .selections
            .iter()
            .enumerate()
            .map(|(index, selection)| {
                let text = if texts.is_empty() {
                    String::new()
                } else {
                    texts[index % texts.len()].clone()
                };
                TextEdit::replace(selection.start(), selection.end(), text)
            })
            .collect::<Vec<_>>()
    };

    ctx.apply_edit(&edits)
}
