use axum::routing::{get, post};
use axum::Router;

use crate::handlers::diagnostics;
use crate::state::AppState;

/// ```text
/// POST /test-db   -> test_database
/// GET  /debug-db  -> debug_database
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/test-db", post(diagnostics::test_database))
        .route("/debug-db", get(diagnostics::debug_database))
}
