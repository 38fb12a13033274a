// Configuration module
// Engine-wide options, set once when the engine is created

use crate::core::history::DEFAULT_HISTORY_SIZE;
use crate::core::prompt::DEFAULT_PROMPT_HISTORY_SIZE;

/// Default enclosing pair patterns, a flat open/close list
pub const DEFAULT_ENCLOSING_PAIRS: &[&str] = &[
    "\\[", "\\]",
    "\\(", "\\)",
    "\\{", "\\}",
    "/\\*", "\\*/",
    "\\bbegin\\b", "\\bend\\b",
];

/// Options controlling engine behavior
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Mode newly opened editors start in
    pub default_mode: String,
    /// Retained command history entries
    pub command_history_size: usize,
    /// Retained entries per prompt history
    pub prompt_history_size: usize,
    /// Enclosing pair patterns used when a seek gives none
    pub enclosing_pairs: Vec<String>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            default_mode: "normal".to_string(),
            command_history_size: DEFAULT_HISTORY_SIZE,
            prompt_history_size: DEFAULT_PROMPT_HISTORY_SIZE,
            enclosing_pairs: DEFAULT_ENCLOSING_PAIRS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl EngineOptions {
    /// Set the mode newly opened editors start in
    pub fn with_default_mode(mut self, mode: &str) -> Self {
        self.default_mode = mode.to_string();
        self
    }

    /// Set the retained command history size
    pub fn with_command_history_size(mut self, size: usize) -> Self {
        self.command_history_size = size;
        self
    }

    /// Set the retained prompt history size
    pub fn with_prompt_history_size(mut self, size: usize) -> Self {
        self.prompt_history_size = size;
        self
    }
}
