use axum::extract::State;
use axum::{routing::get, Json, Router};
use bridge_core::config::RedactedSettings;
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok` when a session is open and its database answers, else `degraded`.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    pub database_connected: bool,
    pub horus_connected: bool,
    /// Current settings without secrets.
    pub config: RedactedSettings,
}

/// GET /health -- returns service, session and settings status.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let session = state.session.current().await;

    let database_connected = match &session {
        Some(s) => bridge_db::health_check(s.pool()).await.is_ok(),
        None => false,
    };
    let horus_connected = session.as_ref().is_some_and(|s| s.horus.is_some());

    let status = if database_connected { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        database_connected,
        horus_connected,
        config: state.settings.read().await.redacted(),
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
