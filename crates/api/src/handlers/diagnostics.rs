//! Connection testing and catalog inspection.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use bridge_core::config::{ConnectionConfigUpdate, SettingsUpdate};
use bridge_db::repositories::SchemaRepo;
use bridge_db::resolver;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/test-db
///
/// Connect with the current database settings overlaid by any non-empty
/// fields in the body, report the server version, and disconnect. Neither
/// the settings nor the active session are changed.
pub async fn test_database(
    State(state): State<AppState>,
    Json(overrides): Json<ConnectionConfigUpdate>,
) -> AppResult<impl IntoResponse> {
    let candidate = state.settings.read().await.merged(&SettingsUpdate {
        database: Some(non_empty_overrides(overrides)),
        horus: None,
    });

    tracing::info!(db_target = %candidate.database.target_label(), "Testing database connection");

    let result = resolver::test_connection(&candidate.database, state.config.db_connect_timeout()).await?;
    Ok(Json(DataResponse { data: result }))
}

/// Drop blank fields so they fall back to the stored settings.
fn non_empty_overrides(overrides: ConnectionConfigUpdate) -> ConnectionConfigUpdate {
    let keep = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
    ConnectionConfigUpdate {
        host: keep(overrides.host),
        port: keep(overrides.port),
        database: keep(overrides.database),
        user: keep(overrides.user),
        password: overrides.password.filter(|p| !p.is_empty()),
    }
}

/// GET /api/v1/debug-db
///
/// Public tables, recording count and the first few recordings of the
/// connected database.
pub async fn debug_database(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let session = state.session.require().await?;
    let overview = SchemaRepo::overview(session.pool()).await?;
    Ok(Json(DataResponse { data: overview }))
}

#[cfg(test)]
mod tests {
    use bridge_core::config::{BridgeSettings, ConnectionConfig};

    use super::*;

    #[test]
    fn blank_overrides_keep_stored_values() {
        let stored = BridgeSettings {
            database: ConnectionConfig {
                host: "db.local".to_string(),
                port: "5433".to_string(),
                database: "catalog".to_string(),
                user: "reader".to_string(),
                password: "hunter2".to_string(),
            },
            ..Default::default()
        };
        let overrides = ConnectionConfigUpdate {
            host: Some("  ".to_string()),
            port: Some(String::new()),
            database: Some("archive".to_string()),
            user: None,
            password: Some(String::new()),
        };

        let candidate = stored.merged(&SettingsUpdate {
            database: Some(non_empty_overrides(overrides)),
            horus: None,
        });

        assert_eq!(candidate.database.host, "db.local");
        assert_eq!(candidate.database.port, "5433");
        assert_eq!(candidate.database.database, "archive");
        assert_eq!(candidate.database.user, "reader");
        assert_eq!(candidate.database.password, "hunter2");
    }
}
