//! Service identity and health routes, served without authentication.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::warn;

use crate::{response::ApiResponse, AppState};

/// GET / - service identity.
pub async fn root(State(state): State<AppState>) -> ApiResponse {
    ApiResponse::ok(
        "service is running",
        json!({
            "service": "busload",
            "version": env!("CARGO_PKG_VERSION"),
            "environment": state.config.environment,
        }),
    )
}

/// GET /health - liveness plus a storage reachability probe.
///
/// Always answers 200; the storage state is reported in the body so an
/// unreachable store degrades the check without flapping the process.
pub async fn health_check(State(state): State<AppState>) -> Response {
    let database = match state.storage.health_check().await {
        Ok(()) => "connected",
        Err(e) => {
            warn!(error = %e, "storage health probe failed");
            "unreachable"
        },
    };

    ApiResponse::ok("health check", json!({ "status": "ok", "database": database }))
        .into_response()
}
