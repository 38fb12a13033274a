//! Interactive prompt state machine
//!
//! Commands that need user input suspend with a `PromptRequest`; the host
//! renders it and feeds events back through the engine. A prompt moves
//! from `Showing` to exactly one of `Accepted` or `Cancelled`, and every
//! event after that transition is ignored, so teardown happens once no
//! matter which of accept, cancel or hide fires first.
//!
//! Prompt history navigation follows the input-box protocol: the cursor
//! starts one past the most recent entry, the in-progress value is saved
//! on the first step back and restored when walking past the end again,
//! and accepting deduplicates, appends and truncates the history.

use unicode_segmentation::UnicodeSegmentation;

use crate::core::error::CancellationReason;

/// Default number of retained prompt history entries
pub const DEFAULT_PROMPT_HISTORY_SIZE: usize = 50;

// =============================================================================
// REQUESTS
// =============================================================================

/// Validation applied to a prompt value on every change and on accept
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Validator {
    /// Accept anything
    #[default]
    None,
    /// Reject the empty string
    NonEmpty,
    /// Require a number, optionally integral and range-checked
    Number {
        /// Reject non-integers
        integer: bool,
        /// Inclusive bounds
        range: Option<(i64, i64)>,
    },
    /// Require a valid, non-empty regular expression
    Regexp,
}

impl Validator {
    /// The validation message for `value`, or `None` when it passes
    pub fn check(&self, value: &str) -> Option<String> {
        match self {
            Validator::None => None,
            Validator::NonEmpty => {
                if value.is_empty() {
                    Some("value cannot be empty".to_string())
                } else {
                    None
                }
            }
            Validator::Number { integer, range } => {
                let n: f64 = match value.parse() {
                    Ok(n) => n,
                    Err(_) => return Some("invalid number".to_string()),
                };

                if let Some((low, high)) = range {
                    if n < *low as f64 || n > *high as f64 {
                        return Some(format!("number out of range [{}, {}]", low, high));
                    }
                }

                if *integer && n.fract() != 0.0 {
                    return Some("number must be an integer".to_string());
                }

                None
            }
            Validator::Regexp => {
                if value.is_empty() {
                    return Some("regular expression cannot be empty".to_string());
                }

                match regex::Regex::new(value) {
                    Ok(_) => None,
                    Err(_) => Some("invalid regular expression".to_string()),
                }
            }
        }
    }
}

/// Parameters of an input-box prompt
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InputRequest {
    /// Short description shown to the user
    pub prompt: String,
    /// Initial value; when absent, the most recent history entry is used
    pub value: Option<String>,
    /// Key into the engine's shared prompt histories
    pub history_key: Option<String>,
    /// Validation applied to the value
    pub validator: Validator,
}

/// One entry of a menu prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    /// Keys that pick this item, e.g. `"("` or `"b, ("`
    pub keys: String,
    /// Shown description
    pub label: String,
}

/// Parameters of a menu (quick-pick) prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuRequest {
    /// Shown above the items
    pub title: String,
    /// The pickable items
    pub items: Vec<MenuItem>,
}

/// What a suspended command is waiting for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptRequest {
    /// A free-form value from an input box
    Input(InputRequest),
    /// A pick from a menu
    Menu(MenuRequest),
    /// The next raw keypress
    Keypress,
}

/// Side-channel actions routed to the active prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptAction {
    /// Step to the next (more recent) history entry
    Next,
    /// Step to the previous (older) history entry
    Previous,
    /// Clear the current value
    Clear,
}

/// Events the host feeds back while a prompt is showing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptEvent {
    /// The user edited the value
    ValueChanged(String),
    /// The user confirmed the current value (or menu item)
    Accept,
    /// The user dismissed the prompt
    Dismiss,
    /// A history/clear action was requested
    Action(PromptAction),
    /// A raw key was pressed (menu matching and keypress requests)
    Key(String),
}

// =============================================================================
// INPUT PROMPT
// =============================================================================

/// Lifecycle state of a prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptState {
    /// Visible and accepting events
    Showing,
    /// Accepted with a valid value
    Accepted,
    /// Torn down without a value
    Cancelled(CancellationReason),
}

/// An active input-box prompt
#[derive(Debug, Clone)]
pub struct Prompt {
    value: String,
    validation_message: Option<String>,
    validator: Validator,
    history: Vec<String>,
    history_size: usize,
    history_index: usize,
    last_history_value: String,
    state: PromptState,
}

impl Prompt {
    /// Show a prompt with the given shared history snapshot.
    ///
    /// When the request carries no initial value the most recent history
    /// entry is used.
    pub fn show(request: InputRequest, history: Vec<String>, history_size: usize) -> Self {
        let value = match request.value {
            Some(value) => value,
            None => history.last().cloned().unwrap_or_default(),
        };

        let history_index = history.len();
        let validation_message = request.validator.check(&value);

        Self {
            last_history_value: value.clone(),
            value,
            validation_message,
            validator: request.validator,
            history,
            history_size,
            history_index,
            state: PromptState::Showing,
        }
    }

    /// Current value
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Message for the current value, if it fails validation
    pub fn validation_message(&self) -> Option<&str> {
        self.validation_message.as_deref()
    }

    /// Lifecycle state
    pub fn state(&self) -> PromptState {
        self.state
    }

    /// Replace the value and re-validate it. Only the latest value's
    /// validation result is ever shown.
    pub fn set_value(&mut self, value: String) {
        if self.state != PromptState::Showing {
            return;
        }

        self.validation_message = self.validator.check(&value);
        self.value = value;
    }

    /// Append a char to the value, for hosts driving the prompt from raw
    /// keystrokes
    pub fn push_char(&mut self, c: char) {
        if self.state != PromptState::Showing {
            return;
        }

        let mut value = std::mem::take(&mut self.value);
        value.push(c);
        self.set_value(value);
    }

    /// Remove the last grapheme cluster from the value
    pub fn pop_grapheme(&mut self) {
        if self.state != PromptState::Showing {
            return;
        }

        let mut value = std::mem::take(&mut self.value);
        if let Some((offset, _)) = value.grapheme_indices(true).next_back() {
            value.truncate(offset);
        }
        self.set_value(value);
    }

    /// Handle a history or clear action
    pub fn action(&mut self, action: PromptAction) {
        if self.state != PromptState::Showing {
            return;
        }

        match action {
            PromptAction::Clear => self.set_value(String::new()),
            PromptAction::Next => {
                if self.history_index == self.history.len() {
                    return;
                }

                self.history_index += 1;

                let value = if self.history_index == self.history.len() {
                    self.last_history_value.clone()
                } else {
                    self.history[self.history_index].clone()
                };
                self.set_value(value);
            }
            PromptAction::Previous => {
                if self.history_index == 0 {
                    return;
                }

                if self.history_index == self.history.len() {
                    self.last_history_value = self.value.clone();
                }

                self.history_index -= 1;
                let value = self.history[self.history_index].clone();
                self.set_value(value);
            }
        }
    }

    /// Try to accept the current value.
    ///
    /// Returns the value when it passes validation, moving to `Accepted`
    /// and committing it to the history. A failing value keeps the prompt
    /// showing with its validation message set.
    pub fn accept(&mut self) -> Option<String> {
        if self.state != PromptState::Showing {
            return None;
        }

        if let Some(message) = self.validator.check(&self.value) {
            self.validation_message = Some(message);
            return None;
        }

        self.commit_history();
        self.state = PromptState::Accepted;
        Some(self.value.clone())
    }

    /// Tear the prompt down without a value
    pub fn cancel(&mut self, reason: CancellationReason) {
        if self.state != PromptState::Showing {
            return;
        }

        self.state = PromptState::Cancelled(reason);
    }

    /// The (possibly updated) history, for writing back into the shared
    /// table after teardown
    pub fn into_history(self) -> Vec<String> {
        self.history
    }

    /// Deduplicate, append and truncate the history with the accepted
    /// value
    fn commit_history(&mut self) {
        if let Some(existing) = self.history.iter().position(|v| v == &self.value) {
            self.history.remove(existing);
        }

        self.history.push(self.value.clone());

        while self.history.len() > self.history_size {
            self.history.remove(0);
        }
    }
}

// =============================================================================
// MENU PROMPT
// =============================================================================

/// Outcome of a menu keystroke
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuOutcome {
    /// The item at this index was picked
    Picked(usize),
    /// The key matched no item
    Unmatched,
}

/// An active menu prompt.
///
/// Items are picked by pressing one of their keys; matching is
/// case-insensitive unless any key contains an uppercase character.
#[derive(Debug, Clone)]
pub struct MenuPrompt {
    items: Vec<MenuItem>,
    item_keys: Vec<Vec<String>>,
    case_significant: bool,
    state: PromptState,
}

impl MenuPrompt {
    /// Show a menu
    pub fn show(request: MenuRequest) -> Self {
        let item_keys = request
            .items
            .iter()
            .map(|item| {
                if item.keys.contains(", ") {
                    item.keys.split(", ").map(str::to_string).collect()
                } else {
                    item.keys.chars().map(|c| c.to_string()).collect()
                }
            })
            .collect();

        let case_significant = request
            .items
            .iter()
            .any(|item| item.keys.to_lowercase() != item.keys);

        Self {
            items: request.items,
            item_keys,
            case_significant,
            state: PromptState::Showing,
        }
    }

    /// The pickable items
    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    /// Lifecycle state
    pub fn state(&self) -> PromptState {
        self.state
    }

    /// Handle a raw keystroke
    pub fn key(&mut self, raw: &str) -> MenuOutcome {
        if self.state != PromptState::Showing {
            return MenuOutcome::Unmatched;
        }

        let key = if self.case_significant {
            raw.to_string()
        } else {
            raw.to_lowercase()
        };

        let index = self
            .item_keys
            .iter()
            .position(|keys| keys.iter().any(|k| k == &key));

        match index {
            Some(index) => {
                self.state = PromptState::Accepted;
                MenuOutcome::Picked(index)
            }
            None => MenuOutcome::Unmatched,
        }
    }

    /// Accept a specific item (mouse pick or explicit confirm)
    pub fn accept(&mut self, index: usize) -> Option<usize> {
        if self.state != PromptState::Showing || index >= self.items.len() {
            return None;
        }

        self.state = PromptState::Accepted;
        Some(index)
    }

    /// Tear the menu down without a pick
    pub fn cancel(&mut self, reason: CancellationReason) {
        if self.state != PromptState::Showing {
            return;
        }

        self.state = PromptState::Cancelled(reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn showing(history: &[&str]) -> Prompt {
        Prompt::show(
            InputRequest::default(),
            history.iter().map(|s| s.to_string()).collect(),
            DEFAULT_PROMPT_HISTORY_SIZE,
        )
    }

    #[test]
    fn test_initial_value_from_history() {
        let prompt = showing(&["older", "recent"]);
        assert_eq!(prompt.value(), "recent");

        let explicit = Prompt::show(
            InputRequest {
                value: Some("given".to_string()),
                ..Default::default()
            },
            vec!["recent".to_string()],
            50,
        );
        assert_eq!(explicit.value(), "given");
    }

    #[test]
    fn test_history_walk_saves_in_progress_value() {
        let mut prompt = showing(&["one", "two"]);
        prompt.set_value("draft".to_string());

        prompt.action(PromptAction::Previous);
        assert_eq!(prompt.value(), "two");
        prompt.action(PromptAction::Previous);
        assert_eq!(prompt.value(), "one");

        // Walking past the oldest entry is a no-op.
        prompt.action(PromptAction::Previous);
        assert_eq!(prompt.value(), "one");

        prompt.action(PromptAction::Next);
        assert_eq!(prompt.value(), "two");
        prompt.action(PromptAction::Next);
        assert_eq!(prompt.value(), "draft");
        prompt.action(PromptAction::Next);
        assert_eq!(prompt.value(), "draft");
    }

    #[test]
    fn test_accept_commits_history_dedup_append_truncate() {
        let mut prompt = Prompt::show(
            InputRequest {
                value: Some("two".to_string()),
                ..Default::default()
            },
            vec!["one".to_string(), "two".to_string(), "three".to_string()],
            3,
        );

        assert_eq!(prompt.accept().unwrap(), "two");
        assert_eq!(prompt.state(), PromptState::Accepted);
        assert_eq!(
            prompt.into_history(),
            vec!["one".to_string(), "three".to_string(), "two".to_string()]
        );
    }

    #[test]
    fn test_invalid_value_blocks_accept() {
        let mut prompt = Prompt::show(
            InputRequest {
                value: Some("".to_string()),
                validator: Validator::Regexp,
                ..Default::default()
            },
            Vec::new(),
            50,
        );

        assert!(prompt.accept().is_none());
        assert_eq!(prompt.state(), PromptState::Showing);
        assert!(prompt.validation_message().is_some());

        prompt.set_value("fo+".to_string());
        assert!(prompt.validation_message().is_none());
        assert_eq!(prompt.accept().unwrap(), "fo+");
    }

    #[test]
    fn test_teardown_happens_once() {
        let mut prompt = showing(&[]);
        prompt.cancel(CancellationReason::PressedEscape);
        assert_eq!(
            prompt.state(),
            PromptState::Cancelled(CancellationReason::PressedEscape)
        );

        // Later events are ignored.
        prompt.cancel(CancellationReason::CancellationToken);
        prompt.set_value("late".to_string());
        assert!(prompt.accept().is_none());
        assert_eq!(
            prompt.state(),
            PromptState::Cancelled(CancellationReason::PressedEscape)
        );
        assert_eq!(prompt.value(), "");
    }

    #[test]
    fn test_grapheme_editing() {
        let mut prompt = showing(&[]);
        prompt.push_char('a');
        prompt.push_char('e');
        prompt.push_char('\u{301}'); // combining acute accent
        assert_eq!(prompt.value(), "ae\u{301}");

        prompt.pop_grapheme();
        assert_eq!(prompt.value(), "a");
    }

    #[test]
    fn test_menu_key_matching() {
        let mut menu = MenuPrompt::show(MenuRequest {
            title: "objects".to_string(),
            items: vec![
                MenuItem {
                    keys: "b, (".to_string(),
                    label: "parentheses".to_string(),
                },
                MenuItem {
                    keys: "B".to_string(),
                    label: "braces".to_string(),
                },
            ],
        });

        // An uppercase key anywhere makes matching case-significant.
        assert_eq!(menu.key("B"), MenuOutcome::Picked(1));
        assert_eq!(menu.state(), PromptState::Accepted);

        let mut menu2 = MenuPrompt::show(MenuRequest {
            title: "objects".to_string(),
            items: vec![MenuItem {
                keys: "b, (".to_string(),
                label: "parentheses".to_string(),
            }],
        });
        assert_eq!(menu2.key("("), MenuOutcome::Picked(0));
    }

    #[test]
    fn test_number_validator() {
        let validator = Validator::Number {
            integer: true,
            range: Some((1, 9)),
        };

        assert!(validator.check("4").is_none());
        assert!(validator.check("0").is_some());
        assert!(validator.check("2.5").is_some());
        assert!(validator.check("x").is_some());
    }
}
