use axum::routing::get;
use axum::Router;

use crate::handlers::settings;
use crate::state::AppState;

/// ```text
/// GET /config  -> get_config
/// PUT /config  -> update_config
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/config",
        get(settings::get_config).put(settings::update_config),
    )
}
