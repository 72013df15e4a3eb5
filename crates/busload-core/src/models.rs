//! Domain models and strongly-typed identifiers.
//!
//! Defines the canonical push record produced by normalization, the stored
//! row shape returned by the document store, and the typed bus-occupancy
//! update body.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{CoreError, Result};

/// Strongly-typed row identifier.
///
/// Wraps the server-generated integer id so record ids cannot be mixed up
/// with counts or other integers. Immutable after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub i64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// One persisted row as returned by the document store.
///
/// Rows are created by a single insert and never mutated or deleted by
/// this system. `json_data` holds the full normalized record opaquely;
/// the `uuid` column is a denormalized copy of the in-payload uuid and is
/// only present on the `push_requests` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRecord {
    /// Server-generated identifier.
    pub id: RecordId,
    /// Server timestamp, set once on insert.
    pub created_at: DateTime<Utc>,
    /// Optional client-supplied correlation id (not unique-enforced).
    #[serde(default)]
    pub uuid: Option<Uuid>,
    /// The normalized record as opaque structured data.
    pub json_data: Value,
}

/// Aggregate seat counts computed over a detection list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionSummary {
    /// Number of detections in the list.
    pub total_detections: u64,
    /// Detections classified as occupied.
    pub occupied_seats: u64,
    /// Detections classified as unoccupied.
    pub unoccupied_seats: u64,
    /// occupied / (occupied + unoccupied) * 100, rounded to 2 decimals.
    /// Zero when no seat was classified either way.
    pub occupancy_percentage: f64,
}

impl DetectionSummary {
    /// Converts the summary into a JSON object.
    pub fn to_value(&self) -> Value {
        json!({
            "total_detections": self.total_detections,
            "occupied_seats": self.occupied_seats,
            "unoccupied_seats": self.unoccupied_seats,
            "occupancy_percentage": self.occupancy_percentage,
        })
    }
}

/// Canonical push record produced by the normalizer.
///
/// Every field is populated: pass-through values keep what the client
/// sent, the rest are server-generated defaults. See [`crate::normalize`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalPush {
    /// Correlation id, generated when the client supplied none.
    pub uuid: Uuid,
    /// Client-supplied receive time, or server time when absent.
    pub received_at: DateTime<Utc>,
    /// The detection list, tolerant of partially-shaped detections.
    pub detection_results: Vec<Value>,
    /// Pass-through summary, or one computed from the detection list.
    pub summary: Value,
    /// Reported model inference time, `0.0` when absent.
    pub inference_time_sec: f64,
    /// Pass-through metadata object, `{}` when absent.
    pub metadata: Value,
    /// Pass-through processing flag, `true` when absent.
    pub processed: bool,
}

impl CanonicalPush {
    /// Serializes the record into the JSON object persisted as `json_data`.
    pub fn to_value(&self) -> Value {
        json!({
            "uuid": self.uuid,
            "received_at": self.received_at,
            "detection_results": self.detection_results,
            "summary": self.summary,
            "inference_time_sec": self.inference_time_sec,
            "metadata": self.metadata,
            "processed": self.processed,
        })
    }
}

/// GPS coordinates attached to a bus occupancy update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

/// Typed body of a bus occupancy update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusOccupancyUpdate {
    /// Unique identifier for the bus.
    pub bus_id: String,
    /// Route identifier.
    pub route_id: String,
    /// Number of passengers currently on board.
    pub occupancy_count: u32,
    /// Maximum capacity of the bus.
    pub max_capacity: u32,
    /// Measurement time; server time is used when absent.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    /// GPS coordinates, optional.
    #[serde(default)]
    pub location: Option<GeoLocation>,
}

impl BusOccupancyUpdate {
    /// Validates capacity bounds.
    ///
    /// Rejects a zero capacity and a count exceeding the capacity. The
    /// count itself cannot be negative by construction.
    pub fn validate(&self) -> Result<()> {
        if self.max_capacity == 0 {
            return Err(CoreError::invalid_payload("max_capacity must be at least 1"));
        }
        if self.occupancy_count > self.max_capacity {
            return Err(CoreError::invalid_payload(format!(
                "occupancy_count {} exceeds max_capacity {}",
                self.occupancy_count, self.max_capacity
            )));
        }
        Ok(())
    }

    /// Current occupancy as a percentage of capacity, 2 decimal places.
    pub fn occupancy_percentage(&self) -> f64 {
        if self.max_capacity == 0 {
            return 0.0;
        }
        round2(f64::from(self.occupancy_count) / f64::from(self.max_capacity) * 100.0)
    }

    /// Builds the JSON document persisted as `json_data`.
    pub fn to_document(&self) -> Value {
        json!({
            "bus_id": self.bus_id,
            "route_id": self.route_id,
            "occupancy_count": self.occupancy_count,
            "max_capacity": self.max_capacity,
            "occupancy_percentage": self.occupancy_percentage(),
            "timestamp": self.timestamp.unwrap_or_else(Utc::now),
            "location": self.location,
        })
    }
}

/// Rounds to 2 decimal places, the precision used everywhere occupancy
/// percentages appear.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
