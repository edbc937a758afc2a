//! text-transmute: apply small pipeline expressions to selected text.
//!
//! An expression like `rev | dupl -c` is split into stages, each stage names
//! a command plus its arguments, and every command transforms the output of
//! the one before it. A leading `+` appends the result below the original
//! text instead of replacing it. Arguments wrapped in backticks are
//! evaluated as arithmetic first (`` dupl `2*3` ``).
//!
//! # Architecture
//!
//! - **[`parse`]**: Expression tokenizer and the backtick arithmetic evaluator.
//! - **[`engine`]**: Command registry, per-stage context and the region executor.
//! - **[`commands`]**: The built-in commands (`rev`, `gen`, `map`, `http`, ...).
//! - **[`host`]**: What an embedding editor provides: regions, prompts, error display.
//! - **[`session`]**: Expression history and the in-progress draft.
//! - **[`config`]**: Configuration loading: embedded defaults + user overlay merge.
//! - **[`logging`]**: File logging to `~/.local/share/text-transmute/transmute.log`.

/// Built-in commands and the trait they implement.
pub mod commands;
/// Configuration types, loading, and overlay merge logic.
pub mod config;
/// Registry, command context and executor.
pub mod engine;
/// Error types.
pub mod error;
/// Host collaborator traits.
pub mod host;
/// File-based run logging.
pub mod logging;
/// Expression tokenizing and arithmetic.
pub mod parse;
/// History and draft state.
pub mod session;

pub use error::TransmuteError;

/// Apply `expression` to `body` using the default configuration.
///
/// This is the main entry point for tests and simple usage. Notices from
/// commands (flag errors, non-numeric `expr` input) go to stderr.
pub fn transmute(body: &str, expression: &str) -> Result<String, TransmuteError> {
    let config = config::Config::default_config();
    let executor = engine::Executor::from_config(&config);
    executor.transmute(body, expression, &mut host::ConsoleSink)
}
