//! Domain and repository error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (malformed
/// identifiers, missing records). Store failures are [`RepositoryError`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested resource was not found (domain-level).
    #[error("not found")]
    NotFound,
}

impl DomainError {
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}

/// Failure raised by a repository or unit of work.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// A staged change referenced a row that is no longer in the store.
    #[error("{entity} {id} does not exist")]
    NotFound { entity: &'static str, id: i32 },

    /// A staged insert collided with a row that is already stored.
    #[error("{entity} {id} already exists")]
    Duplicate { entity: &'static str, id: i32 },

    /// An identifier sequence has issued its last value.
    #[error("{0} identifier sequence exhausted")]
    SequenceExhausted(&'static str),

    /// A lock guarding shared store state was poisoned by a panicking writer.
    #[error("store lock poisoned: {0}")]
    Poisoned(&'static str),
}
