//! Handlers for reading and updating connection settings.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use bridge_core::config::SettingsUpdate;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/config
///
/// Current settings with secrets replaced by `password_set` flags.
pub async fn get_config(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let redacted = state.settings.read().await.redacted();
    Ok(Json(DataResponse { data: redacted }))
}

/// PUT /api/v1/config
///
/// Merge a partial update into the settings without connecting. The active
/// session, if any, keeps running on the settings it was opened with.
pub async fn update_config(
    State(state): State<AppState>,
    Json(update): Json<SettingsUpdate>,
) -> AppResult<impl IntoResponse> {
    if update.is_empty() {
        return Err(AppError::BadRequest(
            "Expected at least one of 'database' or 'horus'".to_string(),
        ));
    }

    let redacted = {
        let mut settings = state.settings.write().await;
        let next = settings.merged(&update);
        if update.horus.is_some() {
            next.horus.validate()?;
        }
        *settings = next;
        settings.redacted()
    };

    tracing::info!(
        db_host = %redacted.database.host,
        db_name = %redacted.database.database,
        horus_url = %redacted.horus.url,
        "Settings updated",
    );

    Ok(Json(DataResponse { data: redacted }))
}
