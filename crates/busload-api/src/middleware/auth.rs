//! Static bearer-token authentication middleware.
//!
//! Every protected route passes through here before touching any
//! downstream component. Failures log the caller address and route at
//! warn level; the presented token is never logged.

use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use busload_core::CoreError;
use tracing::warn;

use crate::{response::error_response, AppState};

/// Extracts the bearer token from the Authorization header.
fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers.get("authorization")?.to_str().ok()?.strip_prefix("Bearer ")
}

/// Compares tokens by SHA-256 digest so the comparison cost does not
/// depend on where the candidate diverges from the configured token.
fn token_matches(candidate: &str, expected: &str) -> bool {
    sha256::digest(candidate.as_bytes()) == sha256::digest(expected.as_bytes())
}

/// Axum middleware enforcing the static bearer token.
pub async fn auth_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let route = req.uri().path().to_string();
    let client = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| "unknown".to_string(), |info| info.0.to_string());

    let Some(token) = extract_bearer(req.headers()) else {
        warn!(%route, %client, "missing or malformed Authorization header");
        return error_response(&CoreError::unauthenticated("missing or malformed bearer token"));
    };

    if !token_matches(token, &state.config.bearer_token) {
        warn!(%route, %client, "bearer token mismatch");
        return error_response(&CoreError::unauthenticated("invalid bearer token"));
    }

    next.run(req).await
}
