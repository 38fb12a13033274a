//! Registers: named storage for text, selections and macros
//!
//! Every register carries a capability set checked before each access, so
//! a read from a write-only register fails with a descriptive error
//! before anything is mutated. Registers are created lazily on first
//! access. Global registers live for the whole engine; document-scoped
//! registers (addressed with a leading space in command arguments) die
//! with their document.

use std::collections::HashMap;

use bitflags::bitflags;

use crate::core::command::CommandRecord;
use crate::core::error::EngineError;
use crate::core::id::DocumentId;
use crate::core::selection::Selection;

bitflags! {
    /// What a register can be used for
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RegisterFlags: u8 {
        /// Text strings can be read
        const CAN_READ = 1 << 0;
        /// Text strings can be written
        const CAN_WRITE = 1 << 1;
        /// Selection snapshots can be read
        const CAN_READ_SELECTIONS = 1 << 2;
        /// Selection snapshots can be written
        const CAN_WRITE_SELECTIONS = 1 << 3;
        /// Macros can be recorded into and replayed from this register
        const CAN_READ_WRITE_MACROS = 1 << 4;
    }
}

/// Where a register lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterScope {
    /// Engine-wide, lives until shutdown
    Global,
    /// Tied to one document, destroyed with it
    Document(DocumentId),
}

/// A fully resolved register address
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegisterSlot {
    /// The scope the register lives in
    pub scope: RegisterScope,
    /// Register name, without the scope marker
    pub name: String,
}

impl RegisterSlot {
    /// A global register
    pub fn global(name: impl Into<String>) -> Self {
        Self {
            scope: RegisterScope::Global,
            name: name.into(),
        }
    }

    /// A register scoped to `document`
    pub fn document(document: DocumentId, name: impl Into<String>) -> Self {
        Self {
            scope: RegisterScope::Document(document),
            name: name.into(),
        }
    }
}

// =============================================================================
// REGISTER
// =============================================================================

/// A single named register.
///
/// Holds up to one value of each kind at the same time: text strings
/// (reused cyclically across selection indices), a selection snapshot,
/// and a recorded macro.
#[derive(Debug, Clone)]
pub struct Register {
    name: String,
    flags: RegisterFlags,
    /// The null register accepts every operation and retains nothing
    null: bool,
    text: Option<Vec<String>>,
    selections: Option<Vec<Selection>>,
    commands: Option<Vec<CommandRecord>>,
}

impl Register {
    fn new(name: impl Into<String>, flags: RegisterFlags) -> Self {
        Self {
            name: name.into(),
            flags,
            null: false,
            text: None,
            selections: None,
            commands: None,
        }
    }

    fn null_register(name: impl Into<String>) -> Self {
        Self {
            null: true,
            ..Self::new(name, RegisterFlags::all())
        }
    }

    /// Register name, without any scope marker
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The capability set of this register
    pub fn flags(&self) -> RegisterFlags {
        self.flags
    }

    /// Fail with a capability error unless this register supports `flags`
    pub fn check(&self, flags: RegisterFlags, action: &'static str) -> Result<(), EngineError> {
        if self.flags.contains(flags) {
            Ok(())
        } else {
            Err(EngineError::Capability {
                register: self.name.clone(),
                action,
            })
        }
    }

    /// Read the stored text strings. The null register always reads empty.
    pub fn text(&self) -> Result<&[String], EngineError> {
        self.check(RegisterFlags::CAN_READ, "read text")?;
        Ok(self.text.as_deref().unwrap_or(&[]))
    }

    /// The text string for selection `index`, reusing entries cyclically
    pub fn text_for(&self, index: usize) -> Result<Option<&str>, EngineError> {
        let strings = self.text()?;
        if strings.is_empty() {
            return Ok(None);
        }
        Ok(Some(strings[index % strings.len()].as_str()))
    }

    /// Store text strings. Writes to the null register are discarded.
    pub fn set_text(&mut self, strings: Vec<String>) -> Result<(), EngineError> {
        self.check(RegisterFlags::CAN_WRITE, "write text")?;
        if !self.null {
            self.text = Some(strings);
        }
        Ok(())
    }

    /// Read the stored selection snapshot
    pub fn selections(&self) -> Result<&[Selection], EngineError> {
        self.check(RegisterFlags::CAN_READ_SELECTIONS, "read selections")?;
        Ok(self.selections.as_deref().unwrap_or(&[]))
    }

    /// Store a selection snapshot
    pub fn set_selections(&mut self, selections: Vec<Selection>) -> Result<(), EngineError> {
        self.check(RegisterFlags::CAN_WRITE_SELECTIONS, "write selections")?;
        if !self.null {
            self.selections = Some(selections);
        }
        Ok(())
    }

    /// Read the recorded macro
    pub fn commands(&self) -> Result<&[CommandRecord], EngineError> {
        self.check(RegisterFlags::CAN_READ_WRITE_MACROS, "replay macros")?;
        Ok(self.commands.as_deref().unwrap_or(&[]))
    }

    /// Store a recorded macro
    pub fn set_commands(&mut self, commands: Vec<CommandRecord>) -> Result<(), EngineError> {
        self.check(RegisterFlags::CAN_READ_WRITE_MACROS, "record macros")?;
        if !self.null {
            self.commands = Some(commands);
        }
        Ok(())
    }
}

// =============================================================================
// REGISTER TABLE
// =============================================================================

/// Default register for yanked text
pub const DQUOTE: &str = "dquote";
/// Default register for search patterns
pub const SLASH: &str = "slash";
/// Default register for recorded macros
pub const AROBASE: &str = "arobase";
/// Default register for saved selections
pub const CARET: &str = "caret";
/// Default register for piped output
pub const PIPE: &str = "pipe";
/// The null register: accepts everything, retains nothing
pub const UNDERSCORE: &str = "underscore";

fn create(name: &str) -> Register {
    let text_only = RegisterFlags::CAN_READ | RegisterFlags::CAN_WRITE;

    match name {
        DQUOTE | SLASH | PIPE => Register::new(name, text_only),
        AROBASE => Register::new(name, text_only | RegisterFlags::CAN_READ_WRITE_MACROS),
        CARET => Register::new(
            name,
            RegisterFlags::CAN_READ_SELECTIONS | RegisterFlags::CAN_WRITE_SELECTIONS,
        ),
        UNDERSCORE => Register::null_register(name),
        _ => Register::new(name, RegisterFlags::all()),
    }
}

/// All registers of the engine: one global table plus one table per
/// document for scoped registers
#[derive(Debug, Default)]
pub struct Registers {
    global: HashMap<String, Register>,
    scoped: HashMap<DocumentId, HashMap<String, Register>>,
}

impl Registers {
    /// Create an empty register table
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a register, creating it lazily on first access
    pub fn get_mut(&mut self, slot: &RegisterSlot) -> &mut Register {
        let table = match slot.scope {
            RegisterScope::Global => &mut self.global,
            RegisterScope::Document(id) => self.scoped.entry(id).or_default(),
        };

        table
            .entry(slot.name.clone())
            .or_insert_with(|| create(&slot.name))
    }

    /// Look up a register without creating it
    pub fn get(&self, slot: &RegisterSlot) -> Option<&Register> {
        match slot.scope {
            RegisterScope::Global => self.global.get(&slot.name),
            RegisterScope::Document(id) => self.scoped.get(&id)?.get(&slot.name),
        }
    }

    /// Drop every register scoped to `document`
    pub fn remove_document(&mut self, document: DocumentId) {
        self.scoped.remove(&document);
    }
}
