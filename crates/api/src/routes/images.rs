use axum::routing::{get, post};
use axum::Router;

use crate::handlers::images;
use crate::state::AppState;

/// ```text
/// POST /images            -> fetch_images
/// GET  /image/{*target}   -> image_by_timestamp
/// ```
///
/// `target` is `<recording key>/<timestamp>`; the key may itself contain
/// `/`, so the split happens at the last separator.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/images", post(images::fetch_images))
        .route("/image/{*target}", get(images::image_by_timestamp))
}
