//! Error handling module for conjecture
//!
//! Provides the error taxonomy for a session using thiserror. Only validation
//! failures and stdout failures are fatal; seen cache I/O problems are logged
//! and recovered inside `seen_store`, so they never surface here.

use thiserror::Error;

/// Main error type for a conjecture session
#[derive(Error, Debug)]
pub enum ConjectureError {
    /// Invalid user input (start value, repeats, after, to). The message is
    /// shown to the user verbatim.
    #[error("{0}")]
    Validation(String),

    /// IO errors on the output stream or the interactive prompt
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for conjecture operations
pub type Result<T> = std::result::Result<T, ConjectureError>;

impl ConjectureError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Returns true if the error was caused by bad user input
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
