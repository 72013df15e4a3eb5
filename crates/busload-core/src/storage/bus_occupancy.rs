//! Repository for bus occupancy documents.

use std::sync::Arc;

use serde_json::{json, Value};

use super::client::SupabaseClient;
use crate::{error::Result, models::StoredRecord};

/// Table holding one row per occupancy update.
pub const TABLE: &str = "bus_occupancy";

/// Store access for the `bus_occupancy` table.
#[derive(Debug)]
pub struct Repository {
    client: Arc<SupabaseClient>,
}

impl Repository {
    /// Creates the repository over a shared store client.
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }

    /// Inserts one occupancy document and returns the stored row.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::StorageUnavailable` when the insert does not
    /// complete.
    pub async fn create(&self, document: &Value) -> Result<StoredRecord> {
        let body = json!({ "json_data": document });

        self.client.insert(TABLE, &body).await
    }

    /// Returns the most recently created row for the given bus, or `None`
    /// when the bus has never reported.
    ///
    /// Latest-by-bus is a query filter ordered by `created_at` descending
    /// with limit 1, not a dedicated index structure.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::StorageUnavailable` when the query fails.
    pub async fn find_latest(&self, bus_id: &str) -> Result<Option<StoredRecord>> {
        self.client.latest(TABLE, "bus_id", bus_id).await
    }
}
