//! History commands: undo, redo, repeat, and macro recording
//!
//! Repeat and macro playback re-enter the dispatcher through nested
//! dispatch, which is depth-limited and cannot suspend on interactive
//! input: recorded invocations carry their resolved arguments, so prompts
//! never fire during replay.

use tracing::info;

use crate::core::command::{CommandRecord, DispatchResult, RawArgs};
use crate::core::context::Context;
use crate::core::error::EngineError;
use crate::core::register::{self, RegisterFlags};

/// `history.undo`: revert the most recent edit batches of the targeted
/// document, one per repetition
pub fn undo(ctx: &mut Context<'_>, args: &mut RawArgs) -> Result<DispatchResult, EngineError> {
    let editor = ctx.editor_id()?;
    for _ in 0..args.repetitions() {
        if !ctx.engine.undo(editor)? {
            break;
        }
    }
    Ok(DispatchResult::Done)
}

/// `history.redo`: re-apply the most recently undone edit batches
pub fn redo(ctx: &mut Context<'_>, args: &mut RawArgs) -> Result<DispatchResult, EngineError> {
    let editor = ctx.editor_id()?;
    for _ in 0..args.repetitions() {
        if !ctx.engine.redo(editor)? {
            break;
        }
    }
    Ok(DispatchResult::Done)
}

/// `history.repeat`: re-dispatch the most recent history entry whose
/// identifier passes the `include`/`exclude` filters.
///
/// Filters use `+` as a one-or-more-characters wildcard. The entry is
/// replayed with its recorded arguments.
pub fn repeat(ctx: &mut Context<'_>, args: &mut RawArgs) -> Result<DispatchResult, EngineError> {
    let repetitions = args.repetitions();

    let record = ctx
        .engine
        .history
        .latest_matching(args.include_pattern.as_deref(), args.exclude_pattern.as_deref())?
        .cloned();
    let record = match record {
        Some(record) => record,
        None => {
            return Err(EngineError::argument(
                "include",
                "no matching command in history",
            ))
        }
    };

    for _ in 0..repetitions {
        ctx.engine
            .dispatch_nested(&record.identifier, record.args.clone())?;
    }

    Ok(DispatchResult::Done)
}

/// `history.recording.start`: begin recording dispatched commands into a
/// macro register (`arobase` by default)
pub fn recording_start(
    ctx: &mut Context<'_>,
    args: &mut RawArgs,
) -> Result<DispatchResult, EngineError> {
    let slot = ctx.engine.resolve_register(
        args,
        register::AROBASE,
        RegisterFlags::CAN_READ_WRITE_MACROS,
        "record macros",
    )?;
    ctx.engine.recorder.start(slot.clone())?;

    info!(register = %slot.name, "macro recording started");
    Ok(DispatchResult::Info(format!(
        "recording into register \"{}\"",
        slot.name
    )))
}

/// `history.recording.stop`: stop recording and store the buffered
/// commands into the recording's register
pub fn recording_stop(
    ctx: &mut Context<'_>,
    _args: &mut RawArgs,
) -> Result<DispatchResult, EngineError> {
    let (slot, commands) = match ctx.engine.recorder.stop() {
        Some(recorded) => recorded,
        None => {
            return Err(EngineError::argument(
                "register",
                "no macro recording is underway",
            ))
        }
    };

    let count = commands.len();
    ctx.engine.register_mut(&slot).set_commands(commands)?;

    info!(register = %slot.name, count, "macro recording stopped");
    Ok(DispatchResult::Info(format!(
        "recorded {} commands into register \"{}\"",
        count, slot.name
    )))
}

/// `history.recording.play`: replay a recorded macro, `count` times.
///
/// An error aborts the current iteration and stops the replay; edits
/// applied by earlier iterations remain.
pub fn recording_play(
    ctx: &mut Context<'_>,
    args: &mut RawArgs,
) -> Result<DispatchResult, EngineError> {
    if ctx.engine.recorder.is_recording() {
        return Err(EngineError::argument(
            "register",
            "cannot replay a macro while recording one",
        ));
    }

    let repetitions = args.repetitions();
    let slot = ctx.engine.resolve_register(
        args,
        register::AROBASE,
        RegisterFlags::CAN_READ_WRITE_MACROS,
        "replay macros",
    )?;
    let commands: Vec<CommandRecord> = ctx.engine.register_mut(&slot).commands()?.to_vec();

    for _ in 0..repetitions {
        for record in &commands {
            ctx.check_cancelled()?;
            ctx.engine
                .dispatch_nested(&record.identifier, record.args.clone())?;
        }
    }

    Ok(DispatchResult::Done)
}

#[cfg(test)]
mod tests {
    use crate::core::command::RawArgs;
    use crate::core::context::Engine;
    use crate::core::register::{RegisterSlot, AROBASE};

    fn engine_with(text: &str) -> Engine {
        let mut engine = Engine::default();
        let doc = engine.open_document(text);
        engine.open_editor(doc).unwrap();
        engine
    }

    fn selection_texts(engine: &Engine) -> Vec<String> {
        let editor = engine.active_editor().unwrap();
        let state = engine.editor(editor).unwrap();
        let doc = engine.document(state.document).unwrap();
        state.selections.iter().map(|s| s.text(doc)).collect()
    }

    #[test]
    fn test_record_and_replay_macro() {
        let mut engine = engine_with("one two three four");

        engine
            .dispatch("history.recording.start", RawArgs::default())
            .unwrap();
        engine.dispatch("seek.word", RawArgs::default()).unwrap();
        engine
            .dispatch("history.recording.stop", RawArgs::default())
            .unwrap();

        // The recording commands themselves were not captured.
        let commands = engine
            .register_mut(&RegisterSlot::global(AROBASE))
            .commands()
            .unwrap()
            .to_vec();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].identifier, "seek.word");

        assert_eq!(selection_texts(&engine), vec!["one ".to_string()]);

        let args = RawArgs {
            count: Some(2),
            ..Default::default()
        };
        engine.dispatch("history.recording.play", args).unwrap();
        assert_eq!(selection_texts(&engine), vec!["three ".to_string()]);
    }

    #[test]
    fn test_repeat_with_filters() {
        let mut engine = engine_with("one two three");

        engine.dispatch("seek.word", RawArgs::default()).unwrap();
        engine
            .dispatch("selections.save", RawArgs::default())
            .unwrap();

        let args = RawArgs {
            include_pattern: Some("seek.+".to_string()),
            ..Default::default()
        };
        engine.dispatch("history.repeat", args).unwrap();

        assert_eq!(selection_texts(&engine), vec!["two ".to_string()]);
    }

    #[test]
    fn test_repeat_without_match_fails() {
        let mut engine = engine_with("one");
        let args = RawArgs {
            include_pattern: Some("nothing.+".to_string()),
            ..Default::default()
        };
        assert!(engine.dispatch("history.repeat", args).is_err());
    }

    #[test]
    fn test_play_while_recording_fails() {
        let mut engine = engine_with("one");
        engine
            .dispatch("history.recording.start", RawArgs::default())
            .unwrap();
        assert!(engine
            .dispatch("history.recording.play", RawArgs::default())
            .is_err());
    }

    #[test]
    fn test_undo_redo_roundtrip() {
        let mut engine = engine_with("hello world");
        let editor = engine.active_editor().unwrap();
        let doc = engine.editor(editor).unwrap().document;
        {
            let doc_ref = engine.document(doc).unwrap();
            let sel = crate::core::selection::Selection::from_offsets(doc_ref, 0, 5);
            engine.set_selections(editor, vec![sel]).unwrap();
        }

        engine.dispatch("edit.delete", RawArgs::default()).unwrap();
        assert_eq!(engine.document(doc).unwrap().text(), " world");

        engine.dispatch("history.undo", RawArgs::default()).unwrap();
        assert_eq!(engine.document(doc).unwrap().text(), "hello world");

        engine.dispatch("history.redo", RawArgs::default()).unwrap();
        assert_eq!(engine.document(doc).unwrap().text(), " world");
    }
}
