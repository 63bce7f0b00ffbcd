use axum::routing::post;
use axum::Router;

use crate::handlers::session;
use crate::state::AppState;

/// ```text
/// POST /connect     -> connect
/// POST /disconnect  -> disconnect
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/connect", post(session::connect))
        .route("/disconnect", post(session::disconnect))
}
