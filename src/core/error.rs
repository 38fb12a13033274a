//! Error taxonomy for the editing engine
//!
//! All failures are classified before any selection or document mutation
//! happens, so a command either runs to completion or leaves the editor
//! untouched. Cancellation is a first-class variant: it carries the reason
//! the operation was torn down and is meant to be suppressed at the
//! dispatch boundary rather than shown to the user.

use thiserror::Error;

/// Why an interactive operation was cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancellationReason {
    /// The engine's cancellation token fired (e.g. a new command started
    /// while a prompt was pending).
    CancellationToken,
    /// The user dismissed the prompt themselves.
    PressedEscape,
}

impl std::fmt::Display for CancellationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CancellationReason::CancellationToken => write!(f, "cancellation token"),
            CancellationReason::PressedEscape => write!(f, "pressed escape"),
        }
    }
}

/// Errors produced by argument resolution, command execution, and the
/// register/prompt subsystems
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    /// A resolved argument failed validation. Reported before the command
    /// body executes; never retried.
    #[error("invalid argument \"{argument}\": {message}")]
    Argument {
        /// Name of the offending argument
        argument: &'static str,
        /// Human-readable description of the problem
        message: String,
    },

    /// A command or register lookup needed an active editor but none is set
    #[error("an active text editor is required")]
    EditorRequired,

    /// An interactive operation was cancelled
    #[error("operation cancelled ({0})")]
    Cancelled(CancellationReason),

    /// A register was accessed without a required capability
    #[error("register \"{register}\" cannot be used to {action}")]
    Capability {
        /// Name of the register
        register: String,
        /// The denied action, e.g. "read text" or "record macros"
        action: &'static str,
    },

    /// A selection update would have produced an empty selection set
    #[error("selection set cannot be emptied")]
    EmptySelectionSet,

    /// The dispatched identifier is not in the command table
    #[error("unknown command \"{0}\"")]
    UnknownCommand(String),

    /// An edit batch was rejected (out of bounds or overlapping ranges)
    #[error("invalid edit: {0}")]
    InvalidEdit(String),
}

impl EngineError {
    /// Build an [`EngineError::Argument`] for the given argument name
    pub fn argument(argument: &'static str, message: impl Into<String>) -> Self {
        EngineError::Argument {
            argument,
            message: message.into(),
        }
    }

    /// Validate an argument-level invariant, failing with a descriptive
    /// error before any mutation takes place
    pub fn validate(
        argument: &'static str,
        condition: bool,
        message: &str,
    ) -> Result<(), EngineError> {
        if condition {
            Ok(())
        } else {
            Err(EngineError::argument(argument, message))
        }
    }

    /// True for cancellation errors, which are suppressed from user display
    pub fn is_cancellation(&self) -> bool {
        matches!(self, EngineError::Cancelled(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_passes_and_fails() {
        assert!(EngineError::validate("pairs", true, "unused").is_ok());

        let err = EngineError::validate("pairs", false, "an even number of pairs must be given")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid argument \"pairs\": an even number of pairs must be given"
        );
    }

    #[test]
    fn test_cancellation_is_suppressed() {
        assert!(EngineError::Cancelled(CancellationReason::PressedEscape).is_cancellation());
        assert!(!EngineError::EditorRequired.is_cancellation());
    }

    #[test]
    fn test_capability_message_names_action() {
        let err = EngineError::Capability {
            register: "slash".to_string(),
            action: "record macros",
        };
        assert_eq!(
            err.to_string(),
            "register \"slash\" cannot be used to record macros"
        );
    }
}
