//! Error types for the expense engine.

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur during engine operation.
///
/// Every engine call fails whole: when an error is returned, no part of the
/// computation's output is available.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A policy precondition was violated by the caller's input
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An invariant that valid input cannot break was broken anyway
    #[error("internal consistency error: {0}")]
    InternalConsistency(String),

    /// Failed to open or read the input file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// Invalid expense row in CSV input
    #[error("Invalid expense row {row}: {message}")]
    InvalidRecord { row: usize, message: String },

    /// Missing input file argument
    #[error("Missing input file argument. Usage: expense-engine <expenses.csv> [settlements|balances|net]")]
    MissingArgument,

    /// Unrecognized output mode argument
    #[error("Unknown output mode '{0}', expected settlements, balances or net")]
    UnknownMode(String),
}

impl EngineError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        EngineError::InvalidInput(message.into())
    }
}
