//! Error taxonomy for the push relay.
//!
//! Each variant corresponds to one failure class the HTTP surface can
//! answer with. Webhook delivery failures are deliberately absent: they
//! are absorbed by the dispatcher and never reach a caller.

use thiserror::Error;

/// Result type alias using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Failure classes surfaced by the relay.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Missing, malformed, or mismatched bearer token (HTTP 401).
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// Request body did not match any accepted payload shape (HTTP 422).
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// No row matched the requested filter (HTTP 404).
    #[error("not found: {0}")]
    NotFound(String),

    /// The managed store rejected or never answered a request (HTTP 500).
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl CoreError {
    /// Creates an authentication failure.
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated(message.into())
    }

    /// Creates a payload validation failure.
    pub fn invalid_payload(message: impl Into<String>) -> Self {
        Self::InvalidPayload(message.into())
    }

    /// Creates a missing-row failure.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Creates a storage failure.
    pub fn storage_unavailable(message: impl Into<String>) -> Self {
        Self::StorageUnavailable(message.into())
    }
}
