//! Error types and result types for gateway operations.
//!
//! This module provides error handling for every component of the gateway.
//! Use [`GatewayResult<T>`] as the return type for fallible operations.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when operating the gateway.
///
/// The first five variants are the client-visible taxonomy; the rest cover
/// serialization and backend infrastructure failures.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The supplied identifier string is not a well-formed document identifier.
    /// Detected by the identifier codec before anything reaches the store.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
    /// A well-formed identifier matched no document, or an update/delete
    /// affected zero records. The first argument is the identifier, the
    /// second the collection name.
    #[error("document {0} not found in collection {1}")]
    NotFound(String, String),
    /// A document or bulk operation is missing a required field, carries a
    /// mistyped field, or fails a boundary validation rule.
    #[error("validation error: {0}")]
    Validation(String),
    /// The target of a bulk request is not one of the known collections.
    #[error("collection not found: {0}")]
    CollectionNotFound(String),
    /// A unique field collided with an existing document. Surfaced by the
    /// store's unique index, never pre-checked by the gateway.
    #[error("unique constraint violation: {0}")]
    UniqueConstraintViolation(String),
    /// Serialization/deserialization error when converting between document
    /// formats (BSON, JSON).
    #[error("serialization error: {0}")]
    Serialization(String),
    /// An error occurred in the underlying storage backend.
    #[error("backend error: {0}")]
    Backend(String),
    /// Error during store initialization or connection setup.
    #[error("initialization error: {0}")]
    Initialization(String),
}

/// Stable client-facing classification of a [`GatewayError`].
///
/// The request layer maps these onto its own status codes; each error kind
/// always lands in the same category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed input: bad identifier, failed validation, unknown collection.
    BadRequest,
    /// Well-formed request that matched nothing.
    NotFound,
    /// Unique-field collision with an existing document.
    Conflict,
    /// Serialization or store-side failure.
    Internal,
}

impl GatewayError {
    /// Returns the stable client-facing category for this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            GatewayError::InvalidIdentifier(_)
            | GatewayError::Validation(_)
            | GatewayError::CollectionNotFound(_) => ErrorCategory::BadRequest,
            GatewayError::NotFound(_, _) => ErrorCategory::NotFound,
            GatewayError::UniqueConstraintViolation(_) => ErrorCategory::Conflict,
            GatewayError::Serialization(_)
            | GatewayError::Backend(_)
            | GatewayError::Initialization(_) => ErrorCategory::Internal,
        }
    }
}

/// A specialized `Result` type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

impl From<BsonError> for GatewayError {
    fn from(err: BsonError) -> Self {
        GatewayError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for GatewayError {
    fn from(err: SerdeJsonError) -> Self {
        GatewayError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_client_error_has_a_stable_category() {
        assert_eq!(
            GatewayError::InvalidIdentifier("xyz".into()).category(),
            ErrorCategory::BadRequest
        );
        assert_eq!(
            GatewayError::NotFound("0".repeat(24), "orders".into()).category(),
            ErrorCategory::NotFound
        );
        assert_eq!(
            GatewayError::UniqueConstraintViolation("email".into()).category(),
            ErrorCategory::Conflict
        );
        assert_eq!(
            GatewayError::Backend("boom".into()).category(),
            ErrorCategory::Internal
        );
    }
}
