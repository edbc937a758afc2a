//! The embedding editor's side of the contract.
//!
//! The engine never touches a buffer directly: it reads regions from a
//! [`Host`], and hands back replacement text with the original offsets.

use serde::{Deserialize, Serialize};

/// A selected span of host text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl Region {
    pub fn new(start: usize, end: usize, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }
}

/// Destination for human-readable error messages.
pub trait ErrorSink {
    fn display_error(&mut self, message: &str);
}

/// Default sink: log the message and print it to stderr.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ErrorSink for ConsoleSink {
    fn display_error(&mut self, message: &str) {
        log::warn!("{message}");
        eprintln!("{message}");
    }
}

/// Sink that keeps every message, for hosts that report in bulk and for tests.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub messages: Vec<String>,
}

impl ErrorSink for CollectingSink {
    fn display_error(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

/// Editor-side collaborator.
///
/// All calls are synchronous and made from one thread; implementations need
/// no locking, and calling the engine concurrently on one host is undefined.
pub trait Host {
    /// Current selection, in document order.
    fn selected_regions(&self) -> Vec<Region>;

    /// Replace `start..end` (offsets as returned by [`Host::selected_regions`]).
    fn replace_region(&mut self, start: usize, end: usize, text: &str);

    /// Ask the user for input. `None` means the prompt was cancelled.
    fn prompt_for_input(&mut self, caption: &str, default_text: &str) -> Option<String>;

    fn show_error(&mut self, message: &str);

    /// File extension of the buffer being edited, if known (`py`, `js`, ...).
    fn syntax(&self) -> Option<String> {
        None
    }
}

/// Routes sink messages to [`Host::show_error`].
pub struct HostSink<'h>(pub &'h mut dyn Host);

impl ErrorSink for HostSink<'_> {
    fn display_error(&mut self, message: &str) {
        self.0.show_error(message);
    }
}
