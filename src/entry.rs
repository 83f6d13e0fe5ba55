//! Code entry on top of reported key presses.
//!
//! The session feeds every reported key into its [`CodeEntry`]; while the
//! buffer is non-empty the second display line shows one star per key.

use crate::types::Key;

/// Result of feeding one key into a [`CodeEntry`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryAction {
    /// Key appended to the code
    Buffered,
    /// `ESC` dropped the buffered code
    Cleared,
    /// `ENT` with a buffered code
    Submitted(String),
    /// `ENT` with nothing buffered
    EmptySubmit,
}

/// Collects keys until `ENT` submits or `ESC` clears the code
#[derive(Debug, Default, Clone)]
pub struct CodeEntry {
    buffer: String,
}

impl CodeEntry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one reported key
    pub fn push(&mut self, key: Key) -> EntryAction {
        match key {
            Key::Escape => {
                self.buffer.clear();
                EntryAction::Cleared
            }
            Key::Enter if self.buffer.is_empty() => EntryAction::EmptySubmit,
            Key::Enter => EntryAction::Submitted(std::mem::take(&mut self.buffer)),
            other => {
                if let Some(c) = other.code_char() {
                    self.buffer.push(c);
                }
                EntryAction::Buffered
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// One star per buffered key, capped at the display width
    pub fn masked(&self, width: usize) -> String {
        "*".repeat(self.buffer.chars().count().min(width))
    }
}
