//! Push ingestion: normalize, persist, notify.

use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
};
use busload_core::{normalize_push, CoreError};
use serde_json::{json, Value};
use tracing::{error, info, instrument};

use crate::{
    response::{error_response, ApiResponse},
    AppState,
};

/// POST /api/v1/push - accepts a detection push in any supported shape.
///
/// The body is parsed by hand so malformed JSON still answers the
/// canonical envelope instead of the framework's plain-text rejection.
/// Persistence failures abort the request; the webhook dispatch after a
/// successful insert is fire-and-forget and cannot fail the caller.
#[instrument(skip_all)]
pub async fn push_data(State(state): State<AppState>, body: Bytes) -> Response {
    let raw: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => {
            let err =
                CoreError::invalid_payload(format!("request body is not valid JSON: {e}"));
            info!(error = %err, "rejected push request");
            return error_response(&err);
        },
    };

    let record = match normalize_push(&raw) {
        Ok(record) => record,
        Err(e) => {
            info!(error = %e, "rejected push request");
            return error_response(&e);
        },
    };

    let stored = match state.storage.push_requests.create(&record).await {
        Ok(stored) => stored,
        Err(e) => {
            error!(uuid = %record.uuid, error = %e, "failed to persist push record");
            return error_response(&e);
        },
    };

    info!(
        record_id = %stored.id,
        uuid = %record.uuid,
        detections = record.detection_results.len(),
        "push record stored"
    );

    state.notifier.notify_new_detection(
        stored.id,
        record.inference_time_sec,
        record.detection_results.clone(),
    );

    ApiResponse::ok(
        "data received and stored",
        json!({
            "record_id": stored.id,
            "uuid": record.uuid,
            "summary": record.summary,
        }),
    )
    .into_response()
}
