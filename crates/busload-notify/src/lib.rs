//! Outbound webhook notification dispatch.
//!
//! Builds the notification payload for a newly stored push record and
//! delivers it through a long-lived, pooled HTTP client. Delivery is
//! at-most-once and fire-and-forget: failures are logged and absorbed,
//! never surfaced to the caller whose push already succeeded.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod error;
pub mod notifier;

pub use client::{ClientConfig, NotifyClient, NotifyResponse};
pub use error::{NotifyError, Result};
pub use notifier::{Notification, Notifier, NEW_DETECTION_EVENT};

/// Default timeout for webhook delivery requests.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 5;

/// Default bound on concurrent outbound requests.
pub const DEFAULT_MAX_CONNECTIONS: usize = 16;
