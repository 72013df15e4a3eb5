//! Repository for normalized push records.

use std::sync::Arc;

use serde_json::json;

use super::client::SupabaseClient;
use crate::{
    error::Result,
    models::{CanonicalPush, StoredRecord},
};

/// Table holding one row per accepted push request.
pub const TABLE: &str = "push_requests";

/// Store access for the `push_requests` table.
#[derive(Debug)]
pub struct Repository {
    client: Arc<SupabaseClient>,
}

impl Repository {
    /// Creates the repository over a shared store client.
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }

    /// Inserts a normalized push record and returns the stored row.
    ///
    /// The payload uuid is denormalized into its own column so lookups
    /// by correlation id stay indexed.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::StorageUnavailable` when the insert does not
    /// complete; the caller must not dispatch a webhook in that case.
    pub async fn create(&self, record: &CanonicalPush) -> Result<StoredRecord> {
        let body = json!({
            "uuid": record.uuid,
            "json_data": record.to_value(),
        });

        self.client.insert(TABLE, &body).await
    }
}
