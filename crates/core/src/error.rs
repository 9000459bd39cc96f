//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic business failures (validation,
/// missing records, conflicts). Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. missing required field).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A requested record was not found (unknown project, wagon type, ...).
    #[error("not found: {0}")]
    NotFound(String),

    /// A unique key already exists (e.g. duplicate monthly plan).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A counter cannot cover the requested amount (e.g. pullout exceeds
    /// the wagons currently ready for dispatch).
    #[error("insufficient: requested {requested}, available {available}")]
    Insufficient { requested: i64, available: i64 },
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn insufficient(requested: i64, available: i64) -> Self {
        Self::Insufficient {
            requested,
            available,
        }
    }
}
