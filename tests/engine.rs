//! End-to-end tests driving the engine the way a host would: dispatch by
//! identifier, answer prompt requests, and observe documents, selections
//! and registers.

use quadrille::config::EngineOptions;
use quadrille::core::command::{ArgValue, RawArgs, RegisterArg};
use quadrille::core::context::{CommandOutcome, Engine};
use quadrille::core::error::{CancellationReason, EngineError};
use quadrille::core::id::EditorId;
use quadrille::core::prompt::{PromptAction, PromptEvent, PromptRequest};
use quadrille::core::register::{RegisterSlot, DQUOTE, SLASH};
use quadrille::core::selection::{Selection, SelectionBehavior};

fn engine_with(text: &str) -> (Engine, EditorId) {
    let mut engine = Engine::default();
    let doc = engine.open_document(text);
    let editor = engine.open_editor(doc).unwrap();
    (engine, editor)
}

fn select(engine: &mut Engine, editor: EditorId, offsets: &[(usize, usize)]) {
    let doc = engine.editor(editor).unwrap().document;
    let doc_ref = engine.document(doc).unwrap();
    let selections = offsets
        .iter()
        .map(|&(anchor, active)| Selection::from_offsets(doc_ref, anchor, active))
        .collect();
    engine.set_selections(editor, selections).unwrap();
}

fn texts(engine: &Engine, editor: EditorId) -> Vec<String> {
    let state = engine.editor(editor).unwrap();
    let doc = engine.document(state.document).unwrap();
    state.selections.iter().map(|s| s.text(doc)).collect()
}

fn doc_text(engine: &Engine, editor: EditorId) -> String {
    let doc = engine.editor(editor).unwrap().document;
    engine.document(doc).unwrap().text()
}

fn args(f: impl FnOnce(&mut RawArgs)) -> RawArgs {
    let mut args = RawArgs::default();
    f(&mut args);
    args
}

// ---------------------------------------------------------------------
// Seeks and selection shaping
// ---------------------------------------------------------------------

#[test]
fn test_character_seek_repeats_make_progress() {
    let (mut engine, editor) = engine_with("a.b.c.d");

    let seek = args(|a| a.input = Some(".".to_string()));
    engine.dispatch("seek.character", seek.clone()).unwrap();
    assert_eq!(texts(&engine, editor), vec!["a".to_string()]);

    engine.dispatch("seek.character", seek).unwrap();
    // The selection moved past the first dot instead of sticking to it.
    let state = engine.editor(editor).unwrap();
    let doc = engine.document(state.document).unwrap();
    assert_eq!(doc.offset_at(state.selections[0].end()), 3);
}

#[test]
fn test_character_seek_include_covers_the_target() {
    let (mut engine, editor) = engine_with("one; two");

    let seek = args(|a| {
        a.input = Some(";".to_string());
        a.include = Some(true);
    });
    engine.dispatch("seek.character", seek).unwrap();
    assert_eq!(texts(&engine, editor), vec!["one;".to_string()]);
}

#[test]
fn test_backward_word_overflow_selects_first_line_start() {
    let (mut engine, editor) = engine_with("first\nsecond");
    select(&mut engine, editor, &[(8, 8)]);

    let back = args(|a| {
        a.direction = Some(ArgValue::Str("backward".to_string()));
        a.count = Some(10);
    });
    engine.dispatch("seek.word", back).unwrap();

    // Overflowing backward below the first line yields the special
    // first-line selection instead of failing.
    let state = engine.editor(editor).unwrap();
    let doc = engine.document(state.document).unwrap();
    let selection = state.selections[0];
    assert_eq!(doc.offset_at(selection.start()), 0);
    assert_eq!(selection.end().line, 1);
    assert_eq!(selection.end().column, 0);
}

#[test]
fn test_extend_keeps_the_anchor() {
    let (mut engine, editor) = engine_with("one two three");

    engine.dispatch("seek.word", RawArgs::default()).unwrap();
    let extend = args(|a| a.shift = Some(ArgValue::Str("extend".to_string())));
    engine.dispatch("seek.word", extend).unwrap();

    assert_eq!(texts(&engine, editor), vec!["one two ".to_string()]);
}

#[test]
fn test_enclosing_seek_matches_nested_pairs() {
    let (mut engine, editor) = engine_with("(a (b) c)");
    select(&mut engine, editor, &[(7, 7)]);

    engine.dispatch("seek.enclosing", RawArgs::default()).unwrap();
    assert_eq!(texts(&engine, editor), vec!["(a (b) c)".to_string()]);
}

// ---------------------------------------------------------------------
// Prompt protocol
// ---------------------------------------------------------------------

#[test]
fn test_prompt_resume_writes_the_value_back() {
    let (mut engine, editor) = engine_with("cat dog cow");
    select(&mut engine, editor, &[(0, 3), (4, 7), (8, 11)]);

    let outcome = engine
        .dispatch("selections.filter", RawArgs::default())
        .unwrap();
    assert!(matches!(outcome, CommandOutcome::Pending(PromptRequest::Input(_))));

    engine
        .prompt_event(PromptEvent::ValueChanged("^c".to_string()))
        .unwrap();
    let outcome = engine.prompt_event(PromptEvent::Accept).unwrap();
    assert_eq!(outcome, CommandOutcome::Done);
    assert_eq!(texts(&engine, editor), vec!["cat".to_string(), "cow".to_string()]);

    // The resumed invocation was recorded with its input resolved.
    let latest = engine.history().latest().unwrap();
    assert_eq!(latest.identifier, "selections.filter");
    assert_eq!(latest.args.input.as_deref(), Some("^c"));
}

#[test]
fn test_prompt_history_walk_saves_and_restores_the_draft() {
    let (mut engine, _) = engine_with("abc abc abc");

    // Two accepted searches seed the shared history.
    for pattern in ["abc", "ab"] {
        engine.dispatch("search", RawArgs::default()).unwrap();
        engine
            .prompt_event(PromptEvent::ValueChanged(pattern.to_string()))
            .unwrap();
        engine.prompt_event(PromptEvent::Accept).unwrap();
    }

    engine.dispatch("search", RawArgs::default()).unwrap();
    engine
        .prompt_event(PromptEvent::ValueChanged("draft".to_string()))
        .unwrap();

    engine
        .prompt_event(PromptEvent::Action(PromptAction::Previous))
        .unwrap();
    assert_eq!(engine.active_prompt().unwrap().value(), "ab");

    engine
        .prompt_event(PromptEvent::Action(PromptAction::Previous))
        .unwrap();
    assert_eq!(engine.active_prompt().unwrap().value(), "abc");

    // Walking forward past the end restores the in-progress value.
    engine
        .prompt_event(PromptEvent::Action(PromptAction::Next))
        .unwrap();
    engine
        .prompt_event(PromptEvent::Action(PromptAction::Next))
        .unwrap();
    assert_eq!(engine.active_prompt().unwrap().value(), "draft");
}

#[test]
fn test_invalid_prompt_value_is_not_accepted() {
    let (mut engine, _) = engine_with("x");

    engine.dispatch("search", RawArgs::default()).unwrap();
    engine
        .prompt_event(PromptEvent::ValueChanged("(unclosed".to_string()))
        .unwrap();

    let outcome = engine.prompt_event(PromptEvent::Accept).unwrap();
    assert!(matches!(outcome, CommandOutcome::Pending(_)));
    assert!(engine.active_prompt().unwrap().validation_message().is_some());
}

#[test]
fn test_dismissing_a_prompt_cancels_the_command() {
    let (mut engine, editor) = engine_with("one two");
    let before = texts(&engine, editor);

    engine.dispatch("search", RawArgs::default()).unwrap();
    let outcome = engine.prompt_event(PromptEvent::Dismiss).unwrap();

    assert_eq!(
        outcome,
        CommandOutcome::Cancelled(CancellationReason::PressedEscape)
    );
    assert!(engine.pending_request().is_none());
    assert_eq!(texts(&engine, editor), before);
}

#[test]
fn test_new_dispatch_replaces_a_parked_command() {
    let (mut engine, editor) = engine_with("one two");

    engine.dispatch("seek.character", RawArgs::default()).unwrap();
    assert_eq!(engine.pending_request(), Some(&PromptRequest::Keypress));

    engine.dispatch("seek.word", RawArgs::default()).unwrap();
    assert!(engine.pending_request().is_none());
    assert_eq!(texts(&engine, editor), vec!["one ".to_string()]);

    // A late answer to the replaced prompt is ignored.
    let outcome = engine
        .prompt_event(PromptEvent::Key(";".to_string()))
        .unwrap();
    assert_eq!(outcome, CommandOutcome::Done);
    assert_eq!(texts(&engine, editor), vec!["one ".to_string()]);
}

// ---------------------------------------------------------------------
// Edits, undo, and multi-editor remapping
// ---------------------------------------------------------------------

#[test]
fn test_edits_remap_every_editor_on_the_document() {
    let mut engine = Engine::default();
    let doc = engine.open_document("alpha beta gamma");
    let first = engine.open_editor(doc).unwrap();
    let second = engine.open_editor(doc).unwrap();

    select(&mut engine, first, &[(0, 5)]);
    select(&mut engine, second, &[(11, 16)]);

    engine.dispatch("edit.delete", RawArgs::default()).unwrap();
    assert_eq!(doc_text(&engine, first), " beta gamma");
    // The other editor's selection slid left with the deleted prefix.
    assert_eq!(texts(&engine, second), vec!["gamma".to_string()]);

    engine.dispatch("history.undo", RawArgs::default()).unwrap();
    assert_eq!(doc_text(&engine, first), "alpha beta gamma");
    assert_eq!(texts(&engine, second), vec!["gamma".to_string()]);
}

#[test]
fn test_insert_cycles_register_strings() {
    let (mut engine, editor) = engine_with("x x x");
    select(&mut engine, editor, &[(0, 1), (2, 3), (4, 5)]);

    engine
        .register_mut(&RegisterSlot::global(DQUOTE))
        .set_text(vec!["1".to_string(), "2".to_string()])
        .unwrap();
    engine.dispatch("edit.insert", RawArgs::default()).unwrap();

    assert_eq!(doc_text(&engine, editor), "1 2 1");
}

#[test]
fn test_rotation_roundtrips_through_undo() {
    let (mut engine, editor) = engine_with("one two three");
    select(&mut engine, editor, &[(0, 3), (4, 7), (8, 13)]);

    engine
        .dispatch("selections.rotate.contents", RawArgs::default())
        .unwrap();
    assert_eq!(doc_text(&engine, editor), "three one two");

    engine.dispatch("history.undo", RawArgs::default()).unwrap();
    assert_eq!(doc_text(&engine, editor), "one two three");
}

// ---------------------------------------------------------------------
// Registers and macros
// ---------------------------------------------------------------------

#[test]
fn test_document_scoped_registers_die_with_the_document() {
    let mut engine = Engine::default();
    let doc = engine.open_document("scoped");
    let editor = engine.open_editor(doc).unwrap();
    select(&mut engine, editor, &[(0, 6)]);

    let save = args(|a| a.register = Some(RegisterArg::Name(" y".to_string())));
    engine.dispatch("selections.save_text", save).unwrap();

    let slot = RegisterSlot::document(doc, "y");
    assert_eq!(
        engine.register_mut(&slot).text().unwrap(),
        ["scoped".to_string()]
    );

    engine.close_document(doc);
    // Recreated lazily and empty: the scoped contents are gone.
    assert!(engine.register_mut(&slot).text().unwrap().is_empty());
}

#[test]
fn test_capability_violations_are_descriptive() {
    let (mut engine, _) = engine_with("x");

    let save = args(|a| a.register = Some(RegisterArg::Name(SLASH.to_string())));
    let err = engine.dispatch("selections.save", save).unwrap_err();

    match err {
        EngineError::Capability { register, action } => {
            assert_eq!(register, "slash");
            assert_eq!(action, "write selections");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_macros_replay_prompted_commands_without_prompting() {
    let (mut engine, editor) = engine_with("a;b;c;d");

    engine
        .dispatch("history.recording.start", RawArgs::default())
        .unwrap();

    // The recorded seek prompts interactively; the recording captures the
    // resolved input instead of the prompt.
    engine.dispatch("seek.character", RawArgs::default()).unwrap();
    engine.prompt_event(PromptEvent::Key(";".to_string())).unwrap();

    engine
        .dispatch("history.recording.stop", RawArgs::default())
        .unwrap();

    let end_of = |engine: &Engine| {
        let state = engine.editor(editor).unwrap();
        let doc = engine.document(state.document).unwrap();
        doc.offset_at(state.selections[0].end())
    };
    assert_eq!(end_of(&engine), 1);

    engine
        .dispatch("history.recording.play", RawArgs::default())
        .unwrap();
    assert_eq!(end_of(&engine), 3);
}

#[test]
fn test_count_composition_feeds_the_next_command() {
    let (mut engine, editor) = engine_with("one two three four");

    let digit = args(|a| a.count = Some(3));
    engine.dispatch("count.update", digit).unwrap();
    engine.dispatch("seek.word", RawArgs::default()).unwrap();

    assert_eq!(texts(&engine, editor), vec!["three ".to_string()]);
}

// ---------------------------------------------------------------------
// Modes and options
// ---------------------------------------------------------------------

#[test]
fn test_custom_modes_change_seek_behavior() {
    let mut engine = Engine::new(EngineOptions::default().with_default_mode("insert"));
    let doc = engine.open_document("abc");
    let editor = engine.open_editor(doc).unwrap();

    assert_eq!(engine.behavior(editor), SelectionBehavior::Caret);

    engine.define_mode("visual", SelectionBehavior::Character);
    let set = args(|a| a.input = Some("visual".to_string()));
    engine.dispatch("modes.set", set).unwrap();
    assert_eq!(engine.behavior(editor), SelectionBehavior::Character);
}

#[test]
fn test_unknown_commands_are_rejected() {
    let (mut engine, _) = engine_with("x");
    let err = engine.dispatch("no.such.command", RawArgs::default()).unwrap_err();
    assert!(matches!(err, EngineError::UnknownCommand(_)));
}

#[test]
fn test_editor_requirement_is_enforced() {
    let mut engine = Engine::default();
    let err = engine.dispatch("seek.word", RawArgs::default()).unwrap_err();
    assert!(matches!(err, EngineError::EditorRequired));
}
