//! The engine: process-wide state and command dispatch
//!
//! `Engine` owns everything with engine lifetime: the document and editor
//! registries, registers, command table, histories, the macro recorder,
//! the active cancellation token and the prompt slot. `Context` is the
//! explicit handle a running command receives; it carries the engine, the
//! editor the command targets and the cancellation token of the current
//! operation.
//!
//! Dispatch is synchronous. A command that needs interactive input
//! returns a request and is parked; the host feeds prompt events back in
//! and the command is re-run with the answered value written into its
//! arguments. Dispatching a new command while one is parked cancels the
//! parked one by firing and replacing the cancellation token.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use crate::config::EngineOptions;
use crate::core::command::{
    CommandDescriptor, CommandFlags, CommandRecord, DispatchResult, RawArgs, RegisterArg,
};
use crate::core::document::{map_offset, Document, TextEdit};
use crate::core::error::{CancellationReason, EngineError};
use crate::core::history::{History, Recorder};
use crate::core::id::{DocumentId, EditorId};
use crate::core::prompt::{MenuOutcome, MenuPrompt, Prompt, PromptEvent, PromptRequest};
use crate::core::register::{Register, RegisterFlags, Registers, RegisterSlot};
use crate::core::selection::{Selection, SelectionBehavior};

/// Maximum recursion depth to prevent stack overflow from recursive
/// macros and repeats
const MAX_DISPATCH_DEPTH: usize = 64;

// =============================================================================
// CANCELLATION TOKEN
// =============================================================================

/// Shared cancellation flag for one operation.
///
/// Tokens are cancelled and replaced, never reset: every completed or
/// cancelled operation leaves a fresh token behind, so a command holding
/// an old token keeps observing the cancellation that ended it.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Rc<Cell<Option<CancellationReason>>>);

impl CancellationToken {
    /// A fresh, uncancelled token
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire the token. The first reason wins.
    pub fn cancel(&self, reason: CancellationReason) {
        if self.0.get().is_none() {
            self.0.set(Some(reason));
        }
    }

    /// True once the token has fired
    pub fn is_cancelled(&self) -> bool {
        self.0.get().is_some()
    }

    /// Why the token fired, if it has
    pub fn reason(&self) -> Option<CancellationReason> {
        self.0.get()
    }
}

// =============================================================================
// EDITORS
// =============================================================================

/// A view into a document: the live selection set and the editing mode
#[derive(Debug, Clone)]
pub struct EditorState {
    /// The document this editor shows
    pub document: DocumentId,
    /// The live selections, never empty
    pub selections: Vec<Selection>,
    /// Name of the current mode
    pub mode: String,
}

/// Disjoint borrows of what most commands need at once
pub struct EditorParts<'a> {
    /// The document snapshot
    pub document: &'a Document,
    /// The editor's selections
    pub selections: &'a mut Vec<Selection>,
    /// Selection behavior of the editor's mode
    pub behavior: SelectionBehavior,
}

/// What the host observes after feeding in a command or prompt event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The command completed
    Done,
    /// The command completed with a message to display
    Info(String),
    /// The command is suspended on this interactive request
    Pending(PromptRequest),
    /// The operation was torn down; not an error to display
    Cancelled(CancellationReason),
}

/// A command suspended on interactive input
#[derive(Debug, Clone)]
struct PendingCommand {
    identifier: String,
    args: RawArgs,
}

#[derive(Debug)]
enum ActivePromptKind {
    Input(Prompt),
    Menu(MenuPrompt),
    Keypress,
}

#[derive(Debug)]
struct ActivePrompt {
    kind: ActivePromptKind,
    request: PromptRequest,
    history_key: Option<String>,
    pending: PendingCommand,
}

// =============================================================================
// ENGINE
// =============================================================================

/// Process-wide editing engine state
pub struct Engine {
    pub(crate) options: EngineOptions,
    documents: HashMap<DocumentId, Document>,
    editors: HashMap<EditorId, EditorState>,
    next_document: usize,
    next_editor: usize,
    active_editor: Option<EditorId>,
    /// Mode name to selection behavior
    modes: HashMap<String, SelectionBehavior>,
    pub(crate) registers: Registers,
    pub(crate) history: History,
    pub(crate) recorder: Recorder,
    commands: HashMap<&'static str, CommandDescriptor>,
    token: CancellationToken,
    /// Ephemeral count composed by `count.update`, folded into the next
    /// dispatch
    pub(crate) pending_count: usize,
    /// Ephemeral register selected by `register.select`
    pub(crate) pending_register: Option<String>,
    pub(crate) prompt_histories: HashMap<String, Vec<String>>,
    active_prompt: Option<ActivePrompt>,
    dispatch_depth: usize,
}

impl Engine {
    /// Create an engine with the full command set registered
    pub fn new(options: EngineOptions) -> Self {
        let mut commands = HashMap::new();
        crate::core::commands::register_all(&mut commands);

        let mut modes = HashMap::new();
        modes.insert("normal".to_string(), SelectionBehavior::Character);
        modes.insert("insert".to_string(), SelectionBehavior::Caret);

        Self {
            history: History::new(options.command_history_size),
            options,
            documents: HashMap::new(),
            editors: HashMap::new(),
            next_document: 0,
            next_editor: 0,
            active_editor: None,
            modes,
            registers: Registers::new(),
            recorder: Recorder::new(),
            commands,
            token: CancellationToken::new(),
            pending_count: 0,
            pending_register: None,
            prompt_histories: HashMap::new(),
            active_prompt: None,
            dispatch_depth: 0,
        }
    }

    // ------------------------------------------------------------------
    // Documents and editors
    // ------------------------------------------------------------------

    /// Open a document with the given initial text
    pub fn open_document(&mut self, text: &str) -> DocumentId {
        let id = DocumentId(self.next_document);
        self.next_document += 1;
        self.documents.insert(id, Document::from_text(text));
        id
    }

    /// Close a document, its editors, and its scoped registers
    pub fn close_document(&mut self, id: DocumentId) {
        self.documents.remove(&id);
        self.editors.retain(|_, editor| editor.document != id);
        self.registers.remove_document(id);

        if let Some(active) = self.active_editor {
            if !self.editors.contains_key(&active) {
                self.active_editor = None;
            }
        }
    }

    /// Open an editor on `document`, with a single empty selection at the
    /// document start
    pub fn open_editor(&mut self, document: DocumentId) -> Result<EditorId, EngineError> {
        if !self.documents.contains_key(&document) {
            return Err(EngineError::argument("document", "unknown document"));
        }

        let id = EditorId(self.next_editor);
        self.next_editor += 1;
        self.editors.insert(
            id,
            EditorState {
                document,
                selections: vec![Selection::empty(crate::core::position::Position::zero())],
                mode: self.options.default_mode.clone(),
            },
        );

        if self.active_editor.is_none() {
            self.active_editor = Some(id);
        }

        Ok(id)
    }

    /// Close an editor
    pub fn close_editor(&mut self, id: EditorId) {
        self.editors.remove(&id);
        if self.active_editor == Some(id) {
            self.active_editor = None;
        }
    }

    /// The editor commands target
    pub fn active_editor(&self) -> Option<EditorId> {
        self.active_editor
    }

    /// Change the editor commands target
    pub fn set_active_editor(&mut self, editor: Option<EditorId>) -> Result<(), EngineError> {
        if let Some(id) = editor {
            if !self.editors.contains_key(&id) {
                return Err(EngineError::argument("editor", "unknown editor"));
            }
        }

        self.active_editor = editor;
        Ok(())
    }

    /// The document behind an id
    pub fn document(&self, id: DocumentId) -> Option<&Document> {
        self.documents.get(&id)
    }

    /// An editor's state
    pub fn editor(&self, id: EditorId) -> Option<&EditorState> {
        self.editors.get(&id)
    }

    /// An editor's selections
    pub fn selections(&self, editor: EditorId) -> Option<&[Selection]> {
        self.editors.get(&editor).map(|e| e.selections.as_slice())
    }

    /// Replace an editor's selections
    pub fn set_selections(
        &mut self,
        editor: EditorId,
        selections: Vec<Selection>,
    ) -> Result<(), EngineError> {
        if selections.is_empty() {
            return Err(EngineError::EmptySelectionSet);
        }

        match self.editors.get_mut(&editor) {
            Some(state) => {
                state.selections = selections;
                Ok(())
            }
            None => Err(EngineError::argument("editor", "unknown editor")),
        }
    }

    /// Define or redefine a mode
    pub fn define_mode(&mut self, name: &str, behavior: SelectionBehavior) {
        self.modes.insert(name.to_string(), behavior);
    }

    /// Switch an editor to a mode
    pub fn set_mode(&mut self, editor: EditorId, mode: &str) -> Result<(), EngineError> {
        if !self.modes.contains_key(mode) {
            return Err(EngineError::argument("mode", format!("unknown mode \"{}\"", mode)));
        }

        match self.editors.get_mut(&editor) {
            Some(state) => {
                state.mode = mode.to_string();
                Ok(())
            }
            None => Err(EngineError::argument("editor", "unknown editor")),
        }
    }

    /// Selection behavior of an editor's current mode
    pub fn behavior(&self, editor: EditorId) -> SelectionBehavior {
        self.editors
            .get(&editor)
            .and_then(|e| self.modes.get(&e.mode))
            .copied()
            .unwrap_or_default()
    }

    /// Borrow the document, selections and behavior of one editor at once
    pub fn parts(&mut self, editor: EditorId) -> Result<EditorParts<'_>, EngineError> {
        let behavior = self.behavior(editor);

        let state = match self.editors.get_mut(&editor) {
            Some(state) => state,
            None => return Err(EngineError::argument("editor", "unknown editor")),
        };
        let document = match self.documents.get(&state.document) {
            Some(document) => document,
            None => return Err(EngineError::argument("document", "unknown document")),
        };

        Ok(EditorParts {
            document,
            selections: &mut state.selections,
            behavior,
        })
    }

    // ------------------------------------------------------------------
    // Edits
    // ------------------------------------------------------------------

    /// Apply one atomic edit batch through `editor`'s document and remap
    /// the selections of every editor showing it
    pub fn apply_edit(&mut self, editor: EditorId, edits: &[TextEdit]) -> Result<(), EngineError> {
        let document_id = match self.editors.get(&editor) {
            Some(state) => state.document,
            None => return Err(EngineError::argument("editor", "unknown editor")),
        };

        let snapshots = self.selection_offsets(document_id);

        let changes = match self.documents.get_mut(&document_id) {
            Some(document) => document.apply_edit(edits)?,
            None => return Err(EngineError::argument("document", "unknown document")),
        };

        self.remap_selections(document_id, snapshots, &changes);
        Ok(())
    }

    /// Undo the most recent edit batch of `editor`'s document. `false`
    /// when there was nothing to undo.
    pub fn undo(&mut self, editor: EditorId) -> Result<bool, EngineError> {
        self.replay_history(editor, |document| document.undo())
    }

    /// Redo the most recently undone edit batch. `false` when there was
    /// nothing to redo.
    pub fn redo(&mut self, editor: EditorId) -> Result<bool, EngineError> {
        self.replay_history(editor, |document| document.redo())
    }

    fn replay_history(
        &mut self,
        editor: EditorId,
        step: impl FnOnce(&mut Document) -> Option<Vec<crate::core::document::AppliedChange>>,
    ) -> Result<bool, EngineError> {
        let document_id = match self.editors.get(&editor) {
            Some(state) => state.document,
            None => return Err(EngineError::argument("editor", "unknown editor")),
        };

        let snapshots = self.selection_offsets(document_id);

        let changes = match self.documents.get_mut(&document_id) {
            Some(document) => match step(document) {
                Some(changes) => changes,
                None => return Ok(false),
            },
            None => return Err(EngineError::argument("document", "unknown document")),
        };

        self.remap_selections(document_id, snapshots, &changes);
        Ok(true)
    }

    /// Pre-edit selection offsets of every editor showing `document`
    fn selection_offsets(&self, document: DocumentId) -> Vec<(EditorId, Vec<(usize, usize)>)> {
        let doc = match self.documents.get(&document) {
            Some(doc) => doc,
            None => return Vec::new(),
        };

        self.editors
            .iter()
            .filter(|(_, editor)| editor.document == document)
            .map(|(id, editor)| {
                let offsets = editor
                    .selections
                    .iter()
                    .map(|s| (doc.offset_at(s.anchor), doc.offset_at(s.active)))
                    .collect();
                (*id, offsets)
            })
            .collect()
    }

    fn remap_selections(
        &mut self,
        document: DocumentId,
        snapshots: Vec<(EditorId, Vec<(usize, usize)>)>,
        changes: &[crate::core::document::AppliedChange],
    ) {
        let doc = match self.documents.get(&document) {
            Some(doc) => doc,
            None => return,
        };

        let mapped: Vec<(EditorId, Vec<Selection>)> = snapshots
            .into_iter()
            .map(|(id, offsets)| {
                let selections = offsets
                    .into_iter()
                    .map(|(anchor, active)| {
                        Selection::new(
                            doc.position_at(map_offset(changes, anchor)),
                            doc.position_at(map_offset(changes, active)),
                        )
                    })
                    .collect();
                (id, selections)
            })
            .collect();

        for (id, selections) in mapped {
            if let Some(editor) = self.editors.get_mut(&id) {
                editor.selections = selections;
            }
        }
    }

    // ------------------------------------------------------------------
    // Registers
    // ------------------------------------------------------------------

    /// Resolve the `register` argument to a slot, check capabilities, and
    /// write the resolved slot back into the arguments.
    ///
    /// A name with a leading space addresses a register scoped to the
    /// active editor's document.
    pub fn resolve_register(
        &mut self,
        args: &mut RawArgs,
        default: &str,
        required: RegisterFlags,
        action: &'static str,
    ) -> Result<RegisterSlot, EngineError> {
        let slot = match &args.register {
            Some(RegisterArg::Resolved(slot)) => slot.clone(),
            Some(RegisterArg::Name(name)) => {
                if let Some(scoped) = name.strip_prefix(' ') {
                    let editor = match self.active_editor {
                        Some(editor) => editor,
                        None => return Err(EngineError::EditorRequired),
                    };
                    let document = match self.editors.get(&editor) {
                        Some(state) => state.document,
                        None => return Err(EngineError::EditorRequired),
                    };
                    RegisterSlot::document(document, scoped)
                } else {
                    RegisterSlot::global(name.clone())
                }
            }
            None => RegisterSlot::global(default),
        };

        self.registers.get_mut(&slot).check(required, action)?;
        args.register = Some(RegisterArg::Resolved(slot.clone()));
        Ok(slot)
    }

    /// Look up a register by resolved slot, creating it lazily
    pub fn register_mut(&mut self, slot: &RegisterSlot) -> &mut Register {
        self.registers.get_mut(slot)
    }

    /// The command history
    pub fn history(&self) -> &History {
        &self.history
    }

    /// The cancellation token of the current operation
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    /// Dispatch a command by identifier.
    ///
    /// A command already suspended on a prompt is cancelled first.
    /// Cancellations are reported through the outcome, not as errors.
    pub fn dispatch(
        &mut self,
        identifier: &str,
        args: RawArgs,
    ) -> Result<CommandOutcome, EngineError> {
        if self.active_prompt.is_some() {
            self.cancel_current(CancellationReason::CancellationToken);
        }

        self.run_command(identifier, args)
    }

    /// Cancel whatever operation is underway: fire and replace the token,
    /// tear down the active prompt, and clear pending count/register.
    pub fn cancel_current(&mut self, reason: CancellationReason) {
        self.token.cancel(reason);

        if let Some(mut active) = self.active_prompt.take() {
            match &mut active.kind {
                ActivePromptKind::Input(prompt) => prompt.cancel(reason),
                ActivePromptKind::Menu(menu) => menu.cancel(reason),
                ActivePromptKind::Keypress => {}
            }
        }

        self.pending_count = 0;
        self.pending_register = None;
        self.token = CancellationToken::new();
    }

    fn run_command(
        &mut self,
        identifier: &str,
        mut args: RawArgs,
    ) -> Result<CommandOutcome, EngineError> {
        let descriptor = match self.commands.get(identifier) {
            Some(descriptor) => *descriptor,
            None => return Err(EngineError::UnknownCommand(identifier.to_string())),
        };

        debug!(command = identifier, "dispatch");

        // Fold the ephemeral count and register into this invocation.
        if !descriptor.flags.contains(CommandFlags::DO_NOT_RECORD) {
            if args.count.unwrap_or(0) <= 0 && self.pending_count > 0 {
                args.count = Some(self.pending_count as isize);
            }
            self.pending_count = 0;

            if args.register.is_none() {
                if let Some(name) = self.pending_register.take() {
                    args.register = Some(RegisterArg::Name(name));
                }
            }
        }

        match self.dispatch_inner(descriptor, &mut args) {
            Ok(DispatchResult::Done) => {
                self.finish_command(descriptor, identifier, &args);
                self.token = CancellationToken::new();
                Ok(CommandOutcome::Done)
            }
            Ok(DispatchResult::Info(message)) => {
                self.finish_command(descriptor, identifier, &args);
                self.token = CancellationToken::new();
                Ok(CommandOutcome::Info(message))
            }
            Ok(DispatchResult::NeedsInput(request)) => {
                self.park(identifier, args, request.clone());
                Ok(CommandOutcome::Pending(request))
            }
            Err(error) => {
                self.token = CancellationToken::new();
                match error {
                    EngineError::Cancelled(reason) => Ok(CommandOutcome::Cancelled(reason)),
                    other => Err(other),
                }
            }
        }
    }

    /// Run a command body under the current token, without top-level
    /// bookkeeping. Used for the outer dispatch and for nested dispatch
    /// from macros and repeats.
    fn dispatch_inner(
        &mut self,
        descriptor: CommandDescriptor,
        args: &mut RawArgs,
    ) -> Result<DispatchResult, EngineError> {
        if self.dispatch_depth >= MAX_DISPATCH_DEPTH {
            return Err(EngineError::argument("command", "recursion limit exceeded"));
        }

        if let Some(reason) = self.token.reason() {
            return Err(EngineError::Cancelled(reason));
        }

        if descriptor.flags.contains(CommandFlags::REQUIRES_ACTIVE_EDITOR)
            && self.active_editor.is_none()
        {
            return Err(EngineError::EditorRequired);
        }

        self.dispatch_depth += 1;

        let editor = self.active_editor;
        let token = self.token.clone();
        let mut context = Context {
            engine: self,
            editor,
            token,
        };
        let result = (descriptor.run)(&mut context, args);

        self.dispatch_depth -= 1;
        result
    }

    /// Dispatch from inside another command (macro replay, repeat).
    ///
    /// Nested invocations are not recorded individually and cannot
    /// suspend on interactive input.
    pub(crate) fn dispatch_nested(
        &mut self,
        identifier: &str,
        mut args: RawArgs,
    ) -> Result<(), EngineError> {
        let descriptor = match self.commands.get(identifier) {
            Some(descriptor) => *descriptor,
            None => return Err(EngineError::UnknownCommand(identifier.to_string())),
        };

        match self.dispatch_inner(descriptor, &mut args)? {
            DispatchResult::Done | DispatchResult::Info(_) => Ok(()),
            DispatchResult::NeedsInput(_) => Err(EngineError::argument(
                "input",
                "interactive input is not available during replay",
            )),
        }
    }

    /// Record a completed top-level invocation into history and any
    /// active macro recording
    fn finish_command(&mut self, descriptor: CommandDescriptor, identifier: &str, args: &RawArgs) {
        if descriptor.flags.contains(CommandFlags::DO_NOT_RECORD) {
            return;
        }

        let record = CommandRecord {
            identifier: identifier.to_string(),
            args: args.clone(),
        };
        self.history.push(record.clone());
        self.recorder.record(record);
    }

    fn park(&mut self, identifier: &str, args: RawArgs, request: PromptRequest) {
        let (kind, history_key) = match &request {
            PromptRequest::Input(input) => {
                let history_key = input.history_key.clone();
                let history = history_key
                    .as_ref()
                    .and_then(|key| self.prompt_histories.get(key).cloned())
                    .unwrap_or_default();
                (
                    ActivePromptKind::Input(Prompt::show(
                        input.clone(),
                        history,
                        self.options.prompt_history_size,
                    )),
                    history_key,
                )
            }
            PromptRequest::Menu(menu) => (ActivePromptKind::Menu(MenuPrompt::show(menu.clone())), None),
            PromptRequest::Keypress => (ActivePromptKind::Keypress, None),
        };

        self.active_prompt = Some(ActivePrompt {
            kind,
            request,
            history_key,
            pending: PendingCommand {
                identifier: identifier.to_string(),
                args,
            },
        });
    }

    // ------------------------------------------------------------------
    // Prompt events
    // ------------------------------------------------------------------

    /// Feed a host prompt event to the active prompt.
    ///
    /// Accepting with a valid value resumes the parked command with the
    /// value written back into its arguments; dismissing cancels it.
    /// Without an active prompt this is a no-op.
    pub fn prompt_event(&mut self, event: PromptEvent) -> Result<CommandOutcome, EngineError> {
        let mut active = match self.active_prompt.take() {
            Some(active) => active,
            None => return Ok(CommandOutcome::Done),
        };

        match &mut active.kind {
            ActivePromptKind::Input(prompt) => match event {
                PromptEvent::ValueChanged(value) => {
                    prompt.set_value(value);
                    self.keep_showing(active)
                }
                PromptEvent::Action(action) => {
                    prompt.action(action);
                    self.keep_showing(active)
                }
                PromptEvent::Key(key) => {
                    let mut chars = key.chars();
                    if let (Some(c), None) = (chars.next(), chars.next()) {
                        prompt.push_char(c);
                    }
                    self.keep_showing(active)
                }
                PromptEvent::Accept => match prompt.accept() {
                    Some(value) => {
                        if let (Some(key), ActivePromptKind::Input(prompt)) =
                            (active.history_key.clone(), active.kind)
                        {
                            self.prompt_histories.insert(key, prompt.into_history());
                        }
                        self.resume(active.pending, value)
                    }
                    None => self.keep_showing(active),
                },
                PromptEvent::Dismiss => {
                    prompt.cancel(CancellationReason::PressedEscape);
                    self.finish_cancelled(CancellationReason::PressedEscape)
                }
            },
            ActivePromptKind::Menu(menu) => match event {
                PromptEvent::Key(key) => match menu.key(&key) {
                    MenuOutcome::Picked(index) => {
                        let value = menu.items()[index].label.clone();
                        self.resume(active.pending, value)
                    }
                    MenuOutcome::Unmatched => self.keep_showing(active),
                },
                PromptEvent::Dismiss => {
                    menu.cancel(CancellationReason::PressedEscape);
                    self.finish_cancelled(CancellationReason::PressedEscape)
                }
                _ => self.keep_showing(active),
            },
            ActivePromptKind::Keypress => match event {
                PromptEvent::Key(key) => self.resume(active.pending, key),
                PromptEvent::Dismiss => {
                    self.finish_cancelled(CancellationReason::PressedEscape)
                }
                _ => self.keep_showing(active),
            },
        }
    }

    /// The request the host should currently be showing, if any
    pub fn pending_request(&self) -> Option<&PromptRequest> {
        self.active_prompt.as_ref().map(|active| &active.request)
    }

    /// The active input prompt, for hosts that render its value and
    /// validation message
    pub fn active_prompt(&self) -> Option<&Prompt> {
        match self.active_prompt.as_ref()?.kind {
            ActivePromptKind::Input(ref prompt) => Some(prompt),
            _ => None,
        }
    }

    fn keep_showing(&mut self, active: ActivePrompt) -> Result<CommandOutcome, EngineError> {
        let request = active.request.clone();
        self.active_prompt = Some(active);
        Ok(CommandOutcome::Pending(request))
    }

    fn finish_cancelled(
        &mut self,
        reason: CancellationReason,
    ) -> Result<CommandOutcome, EngineError> {
        self.token.cancel(reason);
        self.token = CancellationToken::new();
        Ok(CommandOutcome::Cancelled(reason))
    }

    fn resume(
        &mut self,
        pending: PendingCommand,
        value: String,
    ) -> Result<CommandOutcome, EngineError> {
        let mut args = pending.args;
        args.input = Some(value);
        self.run_command(&pending.identifier, args)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineOptions::default())
    }
}

// =============================================================================
// CONTEXT
// =============================================================================

/// The handle a running command receives: the engine, the targeted
/// editor, and the cancellation token of the current operation
pub struct Context<'a> {
    /// The engine, for registers, history, nested dispatch and edits
    pub engine: &'a mut Engine,
    editor: Option<EditorId>,
    token: CancellationToken,
}

impl Context<'_> {
    /// The targeted editor, failing like a command that requires one
    pub fn editor_id(&self) -> Result<EditorId, EngineError> {
        match self.editor {
            Some(editor) => Ok(editor),
            None => Err(EngineError::EditorRequired),
        }
    }

    /// The cancellation token of this operation
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Fail if this operation has been cancelled
    pub fn check_cancelled(&self) -> Result<(), EngineError> {
        match self.token.reason() {
            Some(reason) => Err(EngineError::Cancelled(reason)),
            None => Ok(()),
        }
    }

    /// Document, selections and behavior of the targeted editor
    pub fn parts(&mut self) -> Result<EditorParts<'_>, EngineError> {
        let editor = self.editor_id()?;
        self.engine.parts(editor)
    }

    /// Apply one atomic edit batch through the targeted editor
    pub fn apply_edit(&mut self, edits: &[TextEdit]) -> Result<(), EngineError> {
        let editor = self.editor_id()?;
        self.engine.apply_edit(editor, edits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_editor_lifecycle() {
        let mut engine = Engine::default();
        let doc = engine.open_document("hello");
        let editor = engine.open_editor(doc).unwrap();

        assert_eq!(engine.active_editor(), Some(editor));
        assert_eq!(engine.selections(editor).unwrap().len(), 1);

        engine.close_document(doc);
        assert!(engine.editor(editor).is_none());
        assert_eq!(engine.active_editor(), None);
    }

    #[test]
    fn test_token_cancel_and_replace() {
        let mut engine = Engine::default();
        let before = engine.token().clone();

        engine.cancel_current(CancellationReason::CancellationToken);

        // The old token observes the cancellation; the engine holds a
        // fresh one.
        assert!(before.is_cancelled());
        assert!(!engine.token().is_cancelled());
    }

    #[test]
    fn test_token_first_reason_wins() {
        let token = CancellationToken::new();
        token.cancel(CancellationReason::PressedEscape);
        token.cancel(CancellationReason::CancellationToken);
        assert_eq!(token.reason(), Some(CancellationReason::PressedEscape));
    }

    #[test]
    fn test_resolve_register_scopes_and_writes_back() {
        let mut engine = Engine::default();
        let doc = engine.open_document("x");
        engine.open_editor(doc).unwrap();

        let mut args = RawArgs {
            register: Some(RegisterArg::Name(" a".to_string())),
            ..Default::default()
        };

        let slot = engine
            .resolve_register(&mut args, "dquote", RegisterFlags::CAN_WRITE, "write text")
            .unwrap();
        assert_eq!(slot, RegisterSlot::document(doc, "a"));
        assert_eq!(args.register, Some(RegisterArg::Resolved(slot)));

        // Absent register falls back to the default.
        let mut args = RawArgs::default();
        let slot = engine
            .resolve_register(&mut args, "dquote", RegisterFlags::CAN_WRITE, "write text")
            .unwrap();
        assert_eq!(slot, RegisterSlot::global("dquote"));
    }

    #[test]
    fn test_resolve_register_checks_capabilities() {
        let mut engine = Engine::default();
        let mut args = RawArgs {
            register: Some(RegisterArg::Name("slash".to_string())),
            ..Default::default()
        };

        let err = engine
            .resolve_register(
                &mut args,
                "arobase",
                RegisterFlags::CAN_READ_WRITE_MACROS,
                "record macros",
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::Capability { .. }));
    }

    #[test]
    fn test_apply_edit_remaps_all_editors_on_document() {
        let mut engine = Engine::default();
        let doc = engine.open_document("foo bar");
        let first = engine.open_editor(doc).unwrap();
        let second = engine.open_editor(doc).unwrap();

        engine
            .set_selections(second, vec![Selection::from_offsets(
                engine.document(doc).unwrap(),
                4,
                7,
            )])
            .unwrap();

        engine
            .apply_edit(first, &[TextEdit::insert(
                crate::core::position::Position::zero(),
                "xx",
            )])
            .unwrap();

        let doc_ref = engine.document(doc).unwrap();
        assert_eq!(doc_ref.text(), "xxfoo bar");
        let sel = engine.selections(second).unwrap()[0];
        assert_eq!(doc_ref.offset_at(sel.start()), 6);
        assert_eq!(doc_ref.offset_at(sel.end()), 9);
    }
}
