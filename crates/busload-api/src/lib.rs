//! HTTP surface for the bus occupancy push relay.
//!
//! Composes the bearer-token authenticator, the payload normalizer, the
//! persistence adapter, and the webhook dispatcher behind an Axum router.
//! Every route answers the canonical response envelope.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod server;

use std::sync::Arc;

use busload_core::storage::Storage;
use busload_notify::Notifier;

pub use config::Config;
pub use server::{create_router, start_server};

/// Shared application state, immutable after startup.
///
/// The storage client pool and the webhook client pool are the only
/// resources shared across requests; both are safe for concurrent use.
#[derive(Clone)]
pub struct AppState {
    /// Process-wide configuration, built once from the environment.
    pub config: Arc<Config>,
    /// Persistence repositories backed by the managed store.
    pub storage: Storage,
    /// Outbound webhook dispatcher.
    pub notifier: Notifier,
}
