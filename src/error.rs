//! Error types for the Tally service.

use thiserror::Error;

/// Main error type for Tally operations.
#[derive(Error, Debug)]
pub enum TallyError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A transaction payload failed validation
    #[error("{0}")]
    Validation(String),

    /// The requested transaction does not exist
    #[error("transaction {0} not found")]
    NotFound(uuid::Uuid),

    /// An aggregate over stored amounts does not fit its integer type
    #[error("Arithmetic overflow: {0}")]
    Overflow(String),

    /// Stored data could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Tally operations.
pub type Result<T> = std::result::Result<T, TallyError>;
