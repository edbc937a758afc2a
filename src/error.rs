//! Failure types shared by the engine and the commands.

use thiserror::Error;

use crate::parse::{ExprError, TokenizeError};

/// Failure raised while running a pipeline.
///
/// [`TransmuteError::Tokenize`] fails the whole invocation before any region
/// is touched. Every other variant is an invalid transmutation: it aborts
/// the remaining stages of the current region and leaves that region as it was.
#[derive(Debug, Error)]
pub enum TransmuteError {
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),

    #[error("'{0}' is not a command")]
    UnknownCommand(String),

    /// A command could not proceed with the arguments it was given.
    #[error("'{command}' {reason}")]
    Rejected { command: String, reason: String },

    /// A backtick parameter failed to evaluate.
    #[error("could not evaluate {token}: {source}")]
    Parameter {
        token: String,
        #[source]
        source: ExprError,
    },

    #[error("'{command}' failed: {source}")]
    Collaborator {
        command: String,
        #[source]
        source: CollaboratorError,
    },
}

impl TransmuteError {
    pub fn rejected(command: &str, reason: impl Into<String>) -> Self {
        TransmuteError::Rejected {
            command: command.to_string(),
            reason: reason.into(),
        }
    }

    /// True for failures scoped to a single region.
    pub fn is_invalid_transmutation(&self) -> bool {
        !matches!(self, TransmuteError::Tokenize(_))
    }
}

/// Failure reported by an external collaborator (HTTP, Markdown renderer).
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{0}")]
    Message(String),
}
