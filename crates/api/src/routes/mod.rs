pub mod diagnostics;
pub mod health;
pub mod images;
pub mod recordings;
pub mod session;
pub mod settings;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /connect                          open a session (POST)
/// /disconnect                       close the session (POST)
///
/// /config                           read (GET), merge update (PUT)
///
/// /test-db                          test a database config (POST)
/// /debug-db                         catalog overview (GET)
///
/// /recordings                       list recordings (GET)
/// /recordings/locate?key=           resolve a recording key (GET)
///
/// /images                           window of images (POST)
/// /image/{*target}                  nearest image to <key>/<timestamp> (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(session::router())
        .merge(settings::router())
        .merge(diagnostics::router())
        .nest("/recordings", recordings::router())
        .merge(images::router())
}
