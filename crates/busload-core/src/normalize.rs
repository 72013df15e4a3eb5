//! Schema-tolerant normalization of push payloads.
//!
//! Detection batches arrive in several historical layouts. This module
//! resolves them in a fixed priority order and folds every shape into one
//! canonical record, computing the seat summary when the client did not
//! send one. Normalization is idempotent: feeding a canonical record back
//! in changes nothing but timestamps.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    error::{CoreError, Result},
    models::{round2, CanonicalPush, DetectionSummary},
};

const EXPECTED_KEYS: &str =
    "`detections`, `detection_results`, `data.detection_results`, or a bare detection array";

/// Normalizes a raw JSON payload into the canonical push record.
///
/// Accepted shapes, tried in order:
/// 1. `{"detections": [...]}`
/// 2. `{"detection_results": [...], ...}`
/// 3. `{"data": {"detection_results": [...], "summary": ...}, ...}`
/// 4. a bare array of detection objects
///
/// # Errors
///
/// Returns `CoreError::InvalidPayload` naming the expected keys when no
/// detection list can be located.
pub fn normalize_push(raw: &Value) -> Result<CanonicalPush> {
    let (detection_results, summary) = extract_detections(raw)?;

    let summary =
        summary.unwrap_or_else(|| summarize_detections(&detection_results).to_value());

    let uuid = field(raw, "uuid")
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);

    let received_at = field(raw, "received_at")
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map_or_else(Utc::now, |dt| dt.with_timezone(&Utc));

    let inference_time_sec =
        field(raw, "inference_time_sec").and_then(Value::as_f64).unwrap_or(0.0);

    let metadata = field(raw, "metadata").cloned().unwrap_or_else(|| json!({}));

    let processed = field(raw, "processed").and_then(Value::as_bool).unwrap_or(true);

    Ok(CanonicalPush {
        uuid,
        received_at,
        detection_results,
        summary,
        inference_time_sec,
        metadata,
        processed,
    })
}

/// Computes the seat summary over a detection list.
///
/// A detection counts as occupied when `class_name == "occupied"` or
/// `class_id == 0`, as unoccupied when `class_name == "unoccupied"` or
/// `class_id == 1`. Occupied wins when both match; each detection is
/// counted at most once.
pub fn summarize_detections(detections: &[Value]) -> DetectionSummary {
    let mut occupied = 0u64;
    let mut unoccupied = 0u64;

    for detection in detections {
        if is_occupied(detection) {
            occupied += 1;
        } else if is_unoccupied(detection) {
            unoccupied += 1;
        }
    }

    let seats = occupied + unoccupied;
    #[allow(clippy::cast_precision_loss)]
    let occupancy_percentage =
        if seats > 0 { round2(occupied as f64 / seats as f64 * 100.0) } else { 0.0 };

    DetectionSummary {
        total_detections: detections.len() as u64,
        occupied_seats: occupied,
        unoccupied_seats: unoccupied,
        occupancy_percentage,
    }
}

/// Locates the detection list and any client-supplied summary.
fn extract_detections(raw: &Value) -> Result<(Vec<Value>, Option<Value>)> {
    if let Some(obj) = raw.as_object() {
        if let Some(list) = obj.get("detections").and_then(Value::as_array) {
            return Ok((list.clone(), obj.get("summary").cloned()));
        }
        if let Some(list) = obj.get("detection_results").and_then(Value::as_array) {
            return Ok((list.clone(), obj.get("summary").cloned()));
        }
        if let Some(data) = obj.get("data").and_then(Value::as_object) {
            if let Some(list) = data.get("detection_results").and_then(Value::as_array) {
                let summary = data.get("summary").or_else(|| obj.get("summary")).cloned();
                return Ok((list.clone(), summary));
            }
        }
    }

    if let Some(list) = raw.as_array() {
        return Ok((list.clone(), None));
    }

    Err(CoreError::invalid_payload(format!(
        "no detection list found; expected one of {EXPECTED_KEYS}"
    )))
}

/// Reads a pass-through field from the top level, falling back to the
/// nested `data` object for the wrapped layout.
fn field<'a>(raw: &'a Value, name: &str) -> Option<&'a Value> {
    raw.get(name).or_else(|| raw.get("data").and_then(|data| data.get(name)))
}

fn is_occupied(detection: &Value) -> bool {
    detection.get("class_name").and_then(Value::as_str) == Some("occupied")
        || detection.get("class_id").and_then(Value::as_i64) == Some(0)
}

fn is_unoccupied(detection: &Value) -> bool {
    detection.get("class_name").and_then(Value::as_str) == Some("unoccupied")
        || detection.get("class_id").and_then(Value::as_i64) == Some(1)
}
