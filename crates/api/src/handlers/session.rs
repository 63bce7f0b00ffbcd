//! Handlers for opening and closing the bridge session.
//!
//! Connecting runs the database resolver first; the Horus handshake only
//! runs once the database is up. A database that cannot be reached is
//! reported in the response body, not as an error status. A failed
//! handshake still leaves a usable database session behind, so recordings
//! can be browsed while the media service is unavailable.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use bridge_core::config::{HorusConfig, SettingsUpdate};
use bridge_core::connection::{ConnectionReport, FailureStage, SslPreference};
use bridge_db::resolver::{self, ResolveError};
use bridge_horus::HorusClient;
use serde::Serialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::session::BridgeSession;
use crate::state::AppState;

/// Outcome of the database half of a connect.
#[derive(Debug, Serialize)]
pub struct DatabaseDiagnostics {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl: Option<SslPreference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<FailureStage>,
    pub report: ConnectionReport,
}

#[derive(Debug, Serialize)]
pub struct HorusDiagnostics {
    pub url: String,
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<FailureStage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConnectDiagnostics {
    pub database: DatabaseDiagnostics,
    pub horus: HorusDiagnostics,
}

#[derive(Debug, Serialize)]
pub struct ConnectResponse {
    pub database_connected: bool,
    pub horus_connected: bool,
    pub message: String,
    pub diagnostics: ConnectDiagnostics,
}

#[derive(Debug, Serialize)]
pub struct DisconnectResponse {
    pub disconnected: Vec<&'static str>,
    pub message: String,
}

/// Build a Horus client and run the handshake.
async fn connect_horus(config: &HorusConfig) -> (Option<HorusClient>, HorusDiagnostics) {
    let mut diagnostics = HorusDiagnostics {
        url: config.url.clone(),
        connected: false,
        stage: None,
        error: None,
    };

    let client = match HorusClient::new(config) {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!(error = %e, "Horus settings rejected");
            diagnostics.stage = Some(FailureStage::MalformedRequest);
            diagnostics.error = Some(e.to_string());
            return (None, diagnostics);
        }
    };

    match client.handshake().await {
        Ok(()) => {
            diagnostics.connected = true;
            (Some(client), diagnostics)
        }
        Err(e) => {
            let stage = e.stage();
            tracing::warn!(url = %config.url, %stage, error = %e, "Horus handshake failed");
            diagnostics.stage = Some(stage);
            diagnostics.error = Some(e.to_string());
            (None, diagnostics)
        }
    }
}

/// POST /api/v1/connect
///
/// Merge the body into the settings, then open a new session. The previous
/// session is only replaced once the database connection succeeds. Invalid
/// settings are a 400; unreachable or rejecting servers give a 200 with
/// `database_connected: false` and the attempt report.
pub async fn connect(
    State(state): State<AppState>,
    Json(update): Json<SettingsUpdate>,
) -> AppResult<impl IntoResponse> {
    let settings = {
        let mut current = state.settings.write().await;
        *current = current.merged(&update);
        current.clone()
    };

    tracing::info!(
        db_target = %settings.database.target_label(),
        horus_url = %settings.horus.url,
        "Connecting",
    );

    let resolved =
        match resolver::resolve(&settings.database, state.config.db_connect_timeout()).await {
            Ok(resolved) => resolved,
            Err(ResolveError::Invalid(err)) => return Err(err.into()),
            Err(ResolveError::Failed { report }) => {
                // The Horus handshake is skipped and any previous session stays.
                let stage = report.dominant_stage().unwrap_or(FailureStage::Network);
                let message = format!(
                    "Connection failed. Database: FAIL ({stage}), Horus: skipped"
                );
                tracing::warn!(%stage, "{message}");

                return Ok(Json(DataResponse {
                    data: ConnectResponse {
                        database_connected: false,
                        horus_connected: false,
                        message,
                        diagnostics: ConnectDiagnostics {
                            database: DatabaseDiagnostics {
                                connected: false,
                                database: None,
                                user: None,
                                ssl: None,
                                stage: Some(stage),
                                report,
                            },
                            horus: HorusDiagnostics {
                                url: settings.horus.url.clone(),
                                connected: false,
                                stage: None,
                                error: Some(
                                    "Not attempted: database connection failed".to_string(),
                                ),
                            },
                        },
                    },
                }));
            }
        };

    let (horus, horus_diagnostics) = connect_horus(&settings.horus).await;
    let horus_connected = horus.is_some();

    let message = format!(
        "Connection completed. Database: OK, Horus: {}",
        if horus_connected { "OK" } else { "FAIL" }
    );
    tracing::info!(horus_connected, "{message}");

    let diagnostics = ConnectDiagnostics {
        database: DatabaseDiagnostics {
            connected: true,
            database: Some(resolved.database.clone()),
            user: Some(resolved.user.clone()),
            ssl: Some(resolved.ssl),
            stage: None,
            report: resolved.report,
        },
        horus: horus_diagnostics,
    };

    state
        .session
        .replace(BridgeSession::new(
            resolved.pool,
            resolved.database,
            resolved.user,
            horus,
        ))
        .await;

    Ok(Json(DataResponse {
        data: ConnectResponse {
            database_connected: true,
            horus_connected,
            message,
            diagnostics,
        },
    }))
}

/// POST /api/v1/disconnect
///
/// Close the active session. Succeeds when nothing is connected.
pub async fn disconnect(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let mut disconnected = Vec::new();
    if let Some(session) = state.session.take().await {
        disconnected.push("database");
        if session.horus.is_some() {
            disconnected.push("horus");
        }
    }

    let message = if disconnected.is_empty() {
        "Nothing was connected".to_string()
    } else {
        format!("Disconnected: {}", disconnected.join(", "))
    };
    tracing::info!("{message}");

    Ok(Json(DataResponse {
        data: DisconnectResponse {
            disconnected,
            message,
        },
    }))
}
