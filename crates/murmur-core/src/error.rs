//! Domain-level error types.

use thiserror::Error;
use uuid::Uuid;

/// Domain errors - business logic failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: &'static str, id: Uuid },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized access")]
    Unauthorized,

    #[error(transparent)]
    Repository(#[from] RepoError),
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

/// Feed pagination errors.
///
/// A failed fetch leaves the session untouched and can be retried.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Feed query failed: {0}")]
    Query(#[from] RepoError),

    #[error("Invalid feed configuration: {0}")]
    InvalidConfig(String),
}
