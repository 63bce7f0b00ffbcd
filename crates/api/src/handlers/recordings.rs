//! Recording listing and lookup.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use bridge_core::catalog::Recording;
use bridge_core::locator::locate;
use bridge_core::types::{DbId, Timestamp};
use bridge_db::repositories::RecordingRepo;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// A recording as shown in the client's recording picker.
#[derive(Debug, Serialize)]
pub struct RecordingSummary {
    pub id: DbId,
    /// Directory key to pass back as `recording_endpoint`.
    pub endpoint: String,
    pub name: String,
    pub description: String,
    pub created: Option<Timestamp>,
}

impl From<Recording> for RecordingSummary {
    fn from(recording: Recording) -> Self {
        Self {
            id: recording.id,
            name: recording.display_name(),
            description: format!("Recording from {}", recording.directory),
            endpoint: recording.directory,
            created: recording.created,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LocateParams {
    pub key: String,
}

/// GET /api/v1/recordings
pub async fn list_recordings(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let session = state.session.require().await?;
    let rows = RecordingRepo::list(session.pool()).await?;

    let recordings: Vec<RecordingSummary> = rows
        .into_iter()
        .map(|row| RecordingSummary::from(Recording::from(row)))
        .collect();

    tracing::debug!(count = recordings.len(), "Listed recordings");
    Ok(Json(DataResponse { data: recordings }))
}

/// GET /api/v1/recordings/locate?key=
///
/// Resolve a free-text key and report which strategy matched.
pub async fn locate_recording(
    State(state): State<AppState>,
    Query(params): Query<LocateParams>,
) -> AppResult<impl IntoResponse> {
    let session = state.session.require().await?;
    let located = locate(&session.catalog, &params.key).await?;
    Ok(Json(DataResponse { data: located }))
}
