//! Typed bus-occupancy writes and latest-state reads.

use axum::{
    body::Bytes,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use busload_core::{models::BusOccupancyUpdate, CoreError};
use serde_json::json;
use tracing::{error, info, instrument};

use crate::{
    response::{error_response, ApiResponse},
    AppState,
};

/// POST /api/v1/bus-occupancy - stores a validated occupancy update.
#[instrument(skip_all)]
pub async fn update_bus_occupancy(State(state): State<AppState>, body: Bytes) -> Response {
    let update: BusOccupancyUpdate = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            let err =
                CoreError::invalid_payload(format!("invalid bus occupancy update: {e}"));
            info!(error = %err, "rejected occupancy update");
            return error_response(&err);
        },
    };

    if let Err(e) = update.validate() {
        info!(bus_id = %update.bus_id, error = %e, "rejected occupancy update");
        return error_response(&e);
    }

    let document = update.to_document();
    let stored = match state.storage.bus_occupancy.create(&document).await {
        Ok(stored) => stored,
        Err(e) => {
            error!(bus_id = %update.bus_id, error = %e, "failed to persist occupancy update");
            return error_response(&e);
        },
    };

    info!(
        record_id = %stored.id,
        bus_id = %update.bus_id,
        occupancy_percentage = update.occupancy_percentage(),
        "bus occupancy update stored"
    );

    ApiResponse::ok(
        "bus occupancy updated",
        json!({
            "record_id": stored.id,
            "bus_id": update.bus_id,
            "occupancy_percentage": update.occupancy_percentage(),
        }),
    )
    .into_response()
}

/// GET /api/v1/bus-occupancy/{bus_id} - latest stored update for a bus.
#[instrument(skip(state))]
pub async fn get_bus_occupancy(
    State(state): State<AppState>,
    Path(bus_id): Path<String>,
) -> Response {
    let row = match state.storage.bus_occupancy.find_latest(&bus_id).await {
        Ok(row) => row,
        Err(e) => {
            error!(%bus_id, error = %e, "failed to query occupancy state");
            return error_response(&e);
        },
    };

    let Some(row) = row else {
        let err = CoreError::not_found(format!("no occupancy data for bus {bus_id}"));
        info!(%bus_id, "no occupancy rows for bus");
        return error_response(&err);
    };

    ApiResponse::ok(
        "latest bus occupancy",
        json!({
            "id": row.id,
            "created_at": row.created_at,
            "json_data": row.json_data,
        }),
    )
    .into_response()
}
