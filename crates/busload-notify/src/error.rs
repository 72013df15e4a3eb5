//! Error types for webhook notification delivery.

use thiserror::Error;

/// Result type alias for notification operations.
pub type Result<T> = std::result::Result<T, NotifyError>;

/// Failure conditions during notification delivery.
///
/// None of these reach an API caller: the dispatcher logs them at error
/// level and drops the notification.
#[derive(Debug, Clone, Error)]
pub enum NotifyError {
    /// Network-level connectivity failure.
    #[error("network error: {message}")]
    Network {
        /// Description of the network failure.
        message: String,
    },

    /// Request exceeded the fixed delivery timeout.
    #[error("request timeout after {timeout_seconds}s")]
    Timeout {
        /// Configured timeout in seconds.
        timeout_seconds: u64,
    },

    /// Receiver answered with a non-2xx status.
    #[error("receiver rejected notification: HTTP {status_code}: {body}")]
    Rejected {
        /// HTTP status code returned by the receiver.
        status_code: u16,
        /// Response body, truncated for logging.
        body: String,
    },

    /// The client could not be configured or used.
    #[error("client configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },
}

impl NotifyError {
    /// Creates a network error from a message.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network { message: message.into() }
    }

    /// Creates a timeout error.
    pub fn timeout(timeout_seconds: u64) -> Self {
        Self::Timeout { timeout_seconds }
    }

    /// Creates a rejection error from the receiver's response.
    pub fn rejected(status_code: u16, body: impl Into<String>) -> Self {
        Self::Rejected { status_code, body: body.into() }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }
}
