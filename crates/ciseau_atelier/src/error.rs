//! Error types for codemod execution.

use thiserror::Error;

/// Errors that can occur while running a codemod
#[derive(Debug, Error)]
pub enum CodemodError {
    /// The source could not be parsed; nothing was rewritten
    #[error("Failed to parse source: {}", .diagnostics.join("; "))]
    Parse {
        /// Parser diagnostics, in report order
        diagnostics: Vec<String>,
    },

    /// A pipeline named a codemod that is not registered
    #[error("Unknown codemod: {0}")]
    UnknownCodemod(String),
}
