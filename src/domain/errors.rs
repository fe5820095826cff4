//! Domain error types
//!
//! These errors are framework-agnostic and represent business-level failures.
//! The HTTP mapping lives in `api::error`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    /// Resource not found, with a user-facing message
    #[error("{0}")]
    NotFound(String),
    /// Malformed or rule-violating input
    #[error("{0}")]
    Validation(String),
    /// Uniqueness violation (duplicate email, ...)
    #[error("{0}")]
    Conflict(String),
    /// Operation not allowed in the resource's current state
    #[error("{0}")]
    InvalidState(String),
    /// Requested quantity exceeds current stock
    #[error("Insufficient stock for \"{title}\": only {available} left")]
    InsufficientStock { title: String, available: i32 },
    /// Missing, invalid or expired credentials
    #[error("{0}")]
    Unauthorized(String),
    /// Authenticated but not allowed
    #[error("{0}")]
    Forbidden(String),
    /// Feature disabled by configuration
    #[error("{0}")]
    Unavailable(String),
    /// Database/persistence error
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
    /// External service error
    #[error("External service error: {0}")]
    External(String),
    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(what: &str) -> Self {
        DomainError::NotFound(format!("{} not found", what))
    }

    /// True for failures that are the server's fault rather than the caller's.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            DomainError::Database(_) | DomainError::External(_) | DomainError::Internal(_)
        )
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
