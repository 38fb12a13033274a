//! Command descriptors and the raw argument object
//!
//! Commands are plain function pointers registered under a stable
//! identifier. Every invocation carries a `RawArgs` bag of loosely typed
//! arguments; each argument is resolved exactly once at the dispatch
//! boundary, and resolution writes the canonical value back into the bag
//! so chained commands (and recorded macros) observe what actually ran.

use bitflags::bitflags;

use crate::core::context::Context;
use crate::core::error::EngineError;
use crate::core::prompt::PromptRequest;
use crate::core::selection::{Direction, Shift};

bitflags! {
    /// Requirements and dispatch behavior of a command
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CommandFlags: u8 {
        /// The command needs an active editor to run
        const REQUIRES_ACTIVE_EDITOR = 1 << 0;
        /// The command is never recorded into macros or history
        /// (recording start/stop, count and register composition)
        const DO_NOT_RECORD = 1 << 1;
    }
}

/// Signature of every command implementation
pub type CommandFn = fn(&mut Context<'_>, &mut RawArgs) -> Result<DispatchResult, EngineError>;

/// A registered command: stable identifier, dispatch flags, and the
/// function that runs it
#[derive(Debug, Clone, Copy)]
pub struct CommandDescriptor {
    /// Stable identifier, e.g. `"seek.character"`
    pub identifier: &'static str,
    /// Dispatch requirements
    pub flags: CommandFlags,
    /// The implementation
    pub run: CommandFn,
}

/// Result of a completed dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchResult {
    /// Command executed to completion
    Done,
    /// Command suspended until the host answers an interactive request
    NeedsInput(PromptRequest),
    /// Informational message to display
    Info(String),
}

/// One recorded invocation, as stored in macros and command history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRecord {
    /// Identifier of the dispatched command
    pub identifier: String,
    /// The argument bag, with resolved values written back
    pub args: RawArgs,
}

// =============================================================================
// RAW ARGUMENTS
// =============================================================================

/// A loosely typed argument value, as supplied by keybindings or hosts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    /// Numeric encoding
    Int(isize),
    /// String encoding
    Str(String),
}

/// How the `register` argument arrived: by name, or already resolved and
/// written back by a previous resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterArg {
    /// A register name; a leading space selects the document scope
    Name(String),
    /// The resolved slot, written back after the first resolution
    Resolved(crate::core::register::RegisterSlot),
}

/// The argument bag passed to every command.
///
/// All fields are optional; commands resolve the ones they care about
/// through the accessors below, which validate once and write the
/// canonical value back.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawArgs {
    /// Raw count; `0` or absent means "no count given"
    pub count: Option<isize>,
    /// Register argument, resolved on first use
    pub register: Option<RegisterArg>,
    /// Direction: `1` / `-1` or `"forward"` / `"backward"`
    pub direction: Option<ArgValue>,
    /// Shift: `0..=2` or `"jump"` / `"select"` / `"extend"`
    pub shift: Option<ArgValue>,
    /// Input string; absent triggers an interactive prompt where supported
    pub input: Option<String>,
    /// Character seeks: cover the sought text
    pub include: Option<bool>,
    /// Word motions: use the non-blank charset
    pub ws: Option<bool>,
    /// Word motions: stop at the word end instead of the next start
    pub stop_at_end: Option<bool>,
    /// Rotations: negate the count
    pub reverse: Option<bool>,
    /// Splits: drop empty segments
    pub exclude_empty: Option<bool>,
    /// Filters: keep non-matching selections instead
    pub inverse: Option<bool>,
    /// Enclosing seeks: put the active end on the opening token
    pub open: Option<bool>,
    /// Enclosing seeks: flat open/close pattern list
    pub pairs: Option<Vec<String>>,
    /// History repeat: only consider matching identifiers
    pub include_pattern: Option<String>,
    /// History repeat: skip matching identifiers
    pub exclude_pattern: Option<String>,
    /// Menu commands: the pickable items
    pub items: Option<Vec<crate::core::prompt::MenuItem>>,
}

impl RawArgs {
    /// The count argument: a non-negative integer, defaulting to 0.
    ///
    /// Invalid values are normalized and written back.
    pub fn count(&mut self) -> usize {
        match self.count {
            Some(count) if count >= 0 => count as usize,
            _ => {
                self.count = Some(0);
                0
            }
        }
    }

    /// The count argument interpreted as a repetition count: 0 means 1
    pub fn repetitions(&mut self) -> usize {
        self.count().max(1)
    }

    /// The direction argument, or `default` when absent
    pub fn direction(&self, default: Direction) -> Result<Direction, EngineError> {
        let value = match &self.direction {
            None => return Ok(default),
            Some(value) => value,
        };

        let direction = match value {
            ArgValue::Int(delta) => Direction::from_delta(*delta),
            ArgValue::Str(name) => match name.as_str() {
                "forward" => Some(Direction::Forward),
                "backward" => Some(Direction::Backward),
                _ => None,
            },
        };

        match direction {
            Some(direction) => Ok(direction),
            None => Err(EngineError::argument(
                "direction",
                "must be \"forward\", \"backward\", 1, or -1",
            )),
        }
    }

    /// The shift argument, or `default` when absent
    pub fn shift(&self, default: Shift) -> Result<Shift, EngineError> {
        let value = match &self.shift {
            None => return Ok(default),
            Some(value) => value,
        };

        let shift = match value {
            ArgValue::Int(0) => Some(Shift::Jump),
            ArgValue::Int(1) => Some(Shift::Select),
            ArgValue::Int(2) => Some(Shift::Extend),
            ArgValue::Int(_) => None,
            ArgValue::Str(name) => Shift::from_name(name),
        };

        match shift {
            Some(shift) => Ok(shift),
            None => Err(EngineError::argument(
                "shift",
                "must be \"jump\", \"select\", \"extend\", 0, 1, or 2",
            )),
        }
    }

    /// The input argument if it was given literally (or already written
    /// back by an answered prompt)
    pub fn input(&self) -> Option<&str> {
        self.input.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_normalizes_and_writes_back() {
        let mut args = RawArgs::default();
        assert_eq!(args.count(), 0);
        assert_eq!(args.count, Some(0));

        args.count = Some(-3);
        assert_eq!(args.count(), 0);
        assert_eq!(args.count, Some(0));

        args.count = Some(4);
        assert_eq!(args.count(), 4);
        assert_eq!(args.repetitions(), 4);

        args.count = Some(0);
        assert_eq!(args.repetitions(), 1);
    }

    #[test]
    fn test_direction_encodings() {
        let mut args = RawArgs::default();
        assert_eq!(args.direction(Direction::Forward).unwrap(), Direction::Forward);

        args.direction = Some(ArgValue::Int(-1));
        assert_eq!(args.direction(Direction::Forward).unwrap(), Direction::Backward);

        args.direction = Some(ArgValue::Str("forward".to_string()));
        assert_eq!(args.direction(Direction::Backward).unwrap(), Direction::Forward);

        args.direction = Some(ArgValue::Int(2));
        let err = args.direction(Direction::Forward).unwrap_err();
        assert!(matches!(err, EngineError::Argument { argument: "direction", .. }));
    }

    #[test]
    fn test_shift_encodings() {
        let mut args = RawArgs::default();
        assert_eq!(args.shift(Shift::Select).unwrap(), Shift::Select);

        args.shift = Some(ArgValue::Int(2));
        assert_eq!(args.shift(Shift::Select).unwrap(), Shift::Extend);

        args.shift = Some(ArgValue::Str("jump".to_string()));
        assert_eq!(args.shift(Shift::Select).unwrap(), Shift::Jump);

        args.shift = Some(ArgValue::Str("sideways".to_string()));
        assert!(args.shift(Shift::Select).is_err());
    }
}
