//! Command implementations
//!
//! All engine commands organized into logical sub-modules:
//!
//! - **seek**: Per-selection motions (seek.character, seek.word, seek.enclosing)
//! - **search**: Regex search over the document (search)
//! - **selections**: Selection set operations (save, restore, filter, split, ...)
//! - **rotate**: Selection and content rotation (selections.rotate.*)
//! - **edit**: Text insertion and deletion (edit.insert, edit.delete)
//! - **history**: Undo, redo, repeat and macro recording (history.*)
//! - **misc**: Dispatch plumbing (cancel, count.update, register.select, ...)
//!
//! Every command is a plain function with the
//! [`CommandFn`](crate::core::command::CommandFn) signature, registered
//! under a stable identifier by [`register_all`].

use std::collections::HashMap;

use crate::core::command::{CommandDescriptor, CommandFlags};

/// Text insertion and deletion
pub mod edit;
/// Undo, redo, repeat and macro recording
pub mod history;
/// Dispatch plumbing
pub mod misc;
/// Selection and content rotation
pub mod rotate;
/// Regex search
pub mod search;
/// Per-selection motions
pub mod seek;
/// Selection set operations
pub mod selections;

const EDITOR: CommandFlags = CommandFlags::REQUIRES_ACTIVE_EDITOR;
const NO_RECORD: CommandFlags = CommandFlags::DO_NOT_RECORD;

/// The full command table
const ALL: &[CommandDescriptor] = &[
    // Seek commands
    CommandDescriptor { identifier: "seek.character", flags: EDITOR, run: seek::character },
    CommandDescriptor { identifier: "seek.word", flags: EDITOR, run: seek::word },
    CommandDescriptor { identifier: "seek.enclosing", flags: EDITOR, run: seek::enclosing },
    // Search commands
    CommandDescriptor { identifier: "search", flags: EDITOR, run: search::search },
    // Selection set commands
    CommandDescriptor { identifier: "selections.save", flags: EDITOR, run: selections::save },
    CommandDescriptor { identifier: "selections.restore", flags: EDITOR, run: selections::restore },
    CommandDescriptor { identifier: "selections.save_text", flags: EDITOR, run: selections::save_text },
    CommandDescriptor { identifier: "selections.filter", flags: EDITOR, run: selections::filter },
    CommandDescriptor { identifier: "selections.split", flags: EDITOR, run: selections::split },
    CommandDescriptor { identifier: "selections.split_lines", flags: EDITOR, run: selections::split_lines },
    CommandDescriptor { identifier: "selections.trim_whitespace", flags: EDITOR, run: selections::trim_whitespace },
    // Rotation commands
    CommandDescriptor { identifier: "selections.rotate.both", flags: EDITOR, run: rotate::both },
    CommandDescriptor { identifier: "selections.rotate.contents", flags: EDITOR, run: rotate::contents },
    CommandDescriptor { identifier: "selections.rotate.selections", flags: EDITOR, run: rotate::selections },
    // Editing commands
    CommandDescriptor { identifier: "edit.insert", flags: EDITOR, run: edit::insert },
    CommandDescriptor { identifier: "edit.delete", flags: EDITOR, run: edit::delete },
    // History commands
    CommandDescriptor { identifier: "history.undo", flags: EDITOR, run: history::undo },
    CommandDescriptor { identifier: "history.redo", flags: EDITOR, run: history::redo },
    CommandDescriptor { identifier: "history.repeat", flags: NO_RECORD, run: history::repeat },
    CommandDescriptor {
        identifier: "history.recording.start",
        flags: NO_RECORD,
        run: history::recording_start,
    },
    CommandDescriptor {
        identifier: "history.recording.stop",
        flags: NO_RECORD,
        run: history::recording_stop,
    },
    CommandDescriptor {
        identifier: "history.recording.play",
        flags: CommandFlags::empty(),
        run: history::recording_play,
    },
    // Dispatch plumbing
    CommandDescriptor { identifier: "cancel", flags: NO_RECORD, run: misc::cancel },
    CommandDescriptor { identifier: "count.update", flags: NO_RECORD, run: misc::update_count },
    CommandDescriptor { identifier: "register.select", flags: NO_RECORD, run: misc::select_register },
    CommandDescriptor { identifier: "modes.set", flags: EDITOR, run: misc::set_mode },
    CommandDescriptor { identifier: "menu.open", flags: CommandFlags::empty(), run: misc::open_menu },
];

/// Register every built-in command into `commands`
pub fn register_all(commands: &mut HashMap<&'static str, CommandDescriptor>) {
    for descriptor in ALL {
        commands.insert(descriptor.identifier, *descriptor);
    }
}
