//! Domain error types

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The captured value has no message and is not an error we can report
    #[error("Captured error has no message")]
    MissingMessage,

    /// ID parsing error
    #[error("Invalid ID format: {0}")]
    InvalidId(String),
}
