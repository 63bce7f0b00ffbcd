use axum::routing::get;
use axum::Router;

use crate::handlers::recordings;
use crate::state::AppState;

/// Recording routes mounted at `/recordings`.
///
/// ```text
/// GET /           -> list_recordings
/// GET /locate     -> locate_recording (?key=)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(recordings::list_recordings))
        .route("/locate", get(recordings::locate_recording))
}
