//! Command history and macro recording
//!
//! Every completed dispatch is appended to a bounded history ring. The
//! `repeat` family re-invokes the most recent entry whose identifier
//! matches glob-like filters, where `+` is the only wildcard (one or more
//! characters) and everything else is literal. The recorder buffers
//! dispatches between recording start and stop and hands the buffer to a
//! macro register.

use std::collections::VecDeque;

use regex::Regex;

use crate::core::command::CommandRecord;
use crate::core::error::EngineError;
use crate::core::register::RegisterSlot;

/// Default number of retained history entries
pub const DEFAULT_HISTORY_SIZE: usize = 100;

/// Bounded ring of completed command invocations, most recent last
#[derive(Debug)]
pub struct History {
    entries: VecDeque<CommandRecord>,
    max_size: usize,
}

impl History {
    /// Create a history retaining at most `max_size` entries
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_size,
        }
    }

    /// Append a completed invocation, evicting the oldest entry when full
    pub fn push(&mut self, record: CommandRecord) {
        if self.entries.len() >= self.max_size {
            self.entries.pop_front();
        }
        self.entries.push_back(record);
    }

    /// The most recent entry
    pub fn latest(&self) -> Option<&CommandRecord> {
        self.entries.back()
    }

    /// The most recent entry whose identifier matches `include` (when
    /// given) and does not match `exclude` (when given).
    ///
    /// Filters use `+` as a one-or-more-characters wildcard; everything
    /// else matches literally, anchored at both ends.
    pub fn latest_matching(
        &self,
        include: Option<&str>,
        exclude: Option<&str>,
    ) -> Result<Option<&CommandRecord>, EngineError> {
        let include = match include {
            Some(pattern) => Some(compile_filter("include", pattern)?),
            None => None,
        };
        let exclude = match exclude {
            Some(pattern) => Some(compile_filter("exclude", pattern)?),
            None => None,
        };

        Ok(self.entries.iter().rev().find(|record| {
            if let Some(include) = &include {
                if !include.is_match(&record.identifier) {
                    return false;
                }
            }
            if let Some(exclude) = &exclude {
                if exclude.is_match(&record.identifier) {
                    return false;
                }
            }
            true
        }))
    }

    /// Number of retained entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_SIZE)
    }
}

/// Compile a `+`-wildcard filter into an anchored regex
fn compile_filter(argument: &'static str, pattern: &str) -> Result<Regex, EngineError> {
    let mut source = String::with_capacity(pattern.len() + 4);
    source.push('^');

    for c in pattern.chars() {
        if c == '+' {
            source.push_str(".+");
        } else {
            source.push_str(&regex::escape(&c.to_string()));
        }
    }

    source.push('$');
    Regex::new(&source).map_err(|e| EngineError::argument(argument, e.to_string()))
}

// =============================================================================
// MACRO RECORDER
// =============================================================================

/// Buffers dispatched commands between recording start and stop
#[derive(Debug, Default)]
pub struct Recorder {
    target: Option<RegisterSlot>,
    buffer: Vec<CommandRecord>,
}

impl Recorder {
    /// Create an idle recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a recording is underway
    pub fn is_recording(&self) -> bool {
        self.target.is_some()
    }

    /// The register the current recording will be stored into
    pub fn target(&self) -> Option<&RegisterSlot> {
        self.target.as_ref()
    }

    /// Begin recording into `slot`. Fails if a recording is already
    /// underway.
    pub fn start(&mut self, slot: RegisterSlot) -> Result<(), EngineError> {
        if self.is_recording() {
            return Err(EngineError::argument(
                "register",
                "a macro recording is already underway",
            ));
        }

        self.target = Some(slot);
        self.buffer.clear();
        Ok(())
    }

    /// Append a dispatched command to the recording, if one is underway
    pub fn record(&mut self, record: CommandRecord) {
        if self.is_recording() {
            self.buffer.push(record);
        }
    }

    /// Stop recording, returning the destination and the buffered
    /// commands. `None` when no recording was underway.
    pub fn stop(&mut self) -> Option<(RegisterSlot, Vec<CommandRecord>)> {
        let target = self.target.take()?;
        Some((target, std::mem::take(&mut self.buffer)))
    }
}
