//! Persistence adapter for the managed document store.
//!
//! The repository layer translates between domain models and the two
//! persisted tables. All store access goes through these repositories;
//! handlers never build REST requests themselves.

use std::sync::Arc;

pub mod bus_occupancy;
pub mod client;
pub mod push_requests;

use crate::error::Result;
use client::SupabaseClient;

/// Container for all repository instances providing unified store access.
///
/// Holds one shared REST client (and therefore one connection pool) that
/// every repository reuses. Created once at startup and cloned cheaply
/// into request state.
#[derive(Debug, Clone)]
pub struct Storage {
    /// Repository for normalized push records.
    pub push_requests: Arc<push_requests::Repository>,

    /// Repository for bus occupancy documents.
    pub bus_occupancy: Arc<bus_occupancy::Repository>,

    client: Arc<SupabaseClient>,
}

impl Storage {
    /// Creates a storage instance around the given store client.
    pub fn new(client: SupabaseClient) -> Self {
        let client = Arc::new(client);

        Self {
            push_requests: Arc::new(push_requests::Repository::new(client.clone())),
            bus_occupancy: Arc::new(bus_occupancy::Repository::new(client.clone())),
            client,
        }
    }

    /// Pings the store to verify connectivity.
    ///
    /// Used by the `/health` endpoint; failures are reported as
    /// `database: "unreachable"` rather than a request error.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::StorageUnavailable` when the store does not
    /// answer with a success status.
    pub async fn health_check(&self) -> Result<()> {
        self.client.ping().await
    }
}
