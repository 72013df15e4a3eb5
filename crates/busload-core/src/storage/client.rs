//! REST client for the managed document store.
//!
//! Speaks the PostgREST dialect exposed by the store: inserts ask for the
//! representation back so the generated id is available in one round
//! trip, and reads filter on keys inside the opaque `json_data` column.
//! One client (and one connection pool) is built at startup and shared.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, error};

use crate::{
    error::{CoreError, Result},
    models::StoredRecord,
};

/// Connection settings for the document store.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Base project URL, e.g. `https://xyz.supabase.co`.
    pub base_url: String,
    /// Service key sent as both `apikey` and bearer credential.
    pub service_key: String,
    /// Fixed timeout applied to every store round trip.
    pub timeout: Duration,
}

/// HTTP adapter for the store's REST interface.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl SupabaseClient {
    /// Builds the client and its connection pool.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::StorageUnavailable` if the underlying HTTP
    /// client cannot be constructed.
    pub fn new(config: SupabaseConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("busload/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                CoreError::storage_unavailable(format!("failed to build store client: {e}"))
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            service_key: config.service_key,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Inserts one row and returns the stored representation.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::StorageUnavailable` on network failure, a
    /// non-success status, or a response without the inserted row.
    pub async fn insert(&self, table: &str, body: &Value) -> Result<StoredRecord> {
        debug!(table, "inserting row");

        let response = self
            .http
            .post(self.table_url(table))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await
            .map_err(|e| request_failed(table, &e))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            error!(table, status = status.as_u16(), "store rejected insert");
            return Err(CoreError::storage_unavailable(format!(
                "insert into {table} failed with status {status}: {detail}"
            )));
        }

        let mut rows: Vec<StoredRecord> =
            response.json().await.map_err(|e| request_failed(table, &e))?;

        rows.pop().ok_or_else(|| {
            error!(table, "insert returned no representation");
            CoreError::storage_unavailable(format!("insert into {table} returned no row"))
        })
    }

    /// Fetches the most recently created row whose `json_data` field
    /// `json_key` equals `value`, or `None` when nothing matches.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::StorageUnavailable` on network failure or a
    /// non-success status.
    pub async fn latest(
        &self,
        table: &str,
        json_key: &str,
        value: &str,
    ) -> Result<Option<StoredRecord>> {
        debug!(table, json_key, value, "querying latest row");

        let query: Vec<(String, String)> = vec![
            ("select".to_string(), "id,created_at,json_data".to_string()),
            (format!("json_data->>{json_key}"), format!("eq.{value}")),
            ("order".to_string(), "created_at.desc".to_string()),
            ("limit".to_string(), "1".to_string()),
        ];

        let response = self
            .http
            .get(self.table_url(table))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .query(&query)
            .send()
            .await
            .map_err(|e| request_failed(table, &e))?;

        let status = response.status();
        if !status.is_success() {
            error!(table, status = status.as_u16(), "store rejected query");
            return Err(CoreError::storage_unavailable(format!(
                "query on {table} failed with status {status}"
            )));
        }

        let rows: Vec<StoredRecord> =
            response.json().await.map_err(|e| request_failed(table, &e))?;

        Ok(rows.into_iter().next())
    }

    /// Verifies the store answers at all.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::StorageUnavailable` when the REST root does
    /// not answer with a success status.
    pub async fn ping(&self) -> Result<()> {
        let response = self
            .http
            .get(format!("{}/rest/v1/", self.base_url))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .send()
            .await
            .map_err(|e| CoreError::storage_unavailable(format!("store unreachable: {e}")))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(CoreError::storage_unavailable(format!(
                "store ping answered with status {}",
                response.status()
            )))
        }
    }
}

fn request_failed(table: &str, err: &dyn std::fmt::Display) -> CoreError {
    error!(table, error = %err, "store request failed");
    CoreError::storage_unavailable(format!("{table}: {err}"))
}
