#![allow(dead_code)]

use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::Path;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get as route_get;
use axum::Router;
use bridge_core::config::{BridgeSettings, HorusConfig};
use bridge_api::config::ServerConfig;
use bridge_api::router::build_app_router;
use bridge_api::session::BridgeSession;
use bridge_api::state::AppState;
use bridge_horus::HorusClient;
use http_body_util::BodyExt;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5001".to_string()],
        request_timeout_secs: 30,
        db_connect_timeout_secs: 2,
    }
}

/// State with default settings and no session.
pub fn test_state() -> AppState {
    AppState::new(test_config(), BridgeSettings::default())
}

/// State with a session on `pool` already installed.
pub async fn connected_state(pool: PgPool, horus: Option<HorusClient>) -> AppState {
    let state = test_state();
    state
        .session
        .replace(BridgeSession::new(
            pool,
            "horus_test".to_string(),
            "tester".to_string(),
            horus,
        ))
        .await;
    state
}

/// Build the full application router, with the same middleware stack the
/// binary uses.
pub fn build_test_app(state: AppState) -> Router {
    let config = test_config();
    build_app_router(state, &config).unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn send_json(app: Router, method: Method, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send_json(app, Method::POST, uri, body).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send_json(app, Method::PUT, uri, body).await
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Database credentials
// ---------------------------------------------------------------------------

/// Create a throwaway login role; roles are cluster-wide so the name is unique.
pub async fn create_login_role(pool: &PgPool, password: &str) -> String {
    let role = format!("bridge_reader_{}", Uuid::new_v4().simple());
    sqlx::query(&format!("CREATE ROLE {role} LOGIN PASSWORD '{password}'"))
        .execute(pool)
        .await
        .unwrap();
    role
}

pub async fn drop_role(pool: &PgPool, role: &str) {
    let _ = sqlx::query(&format!("DROP ROLE IF EXISTS {role}"))
        .execute(pool)
        .await;
}

/// `/connect` body for the test database as `user`.
pub fn database_settings(pool: &PgPool, user: &str, password: &str) -> serde_json::Value {
    let options = pool.connect_options();
    serde_json::json!({
        "host": options.get_host(),
        "port": options.get_port().to_string(),
        "database": options.get_database().unwrap_or("postgres"),
        "user": user,
        "password": password,
    })
}

/// A port on localhost with nothing listening.
pub async fn closed_port() -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

// ---------------------------------------------------------------------------
// Catalog fixtures
// ---------------------------------------------------------------------------

pub async fn insert_recording(pool: &PgPool, directory: &str) -> i64 {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO recordings (directory, created) VALUES ($1, NOW()) RETURNING id",
    )
    .bind(directory)
    .fetch_one(pool)
    .await
    .unwrap();
    id
}

pub async fn insert_frame(
    pool: &PgPool,
    recording_id: i64,
    guid: Uuid,
    index: i32,
    stamp: Option<chrono::DateTime<chrono::Utc>>,
) {
    sqlx::query(
        "INSERT INTO frames (recordingid, guid, \"index\", stamp) VALUES ($1, $2, $3, $4)",
    )
    .bind(recording_id)
    .bind(guid)
    .bind(index)
    .bind(stamp)
    .execute(pool)
    .await
    .unwrap();
}

// ---------------------------------------------------------------------------
// Mock Horus service
// ---------------------------------------------------------------------------

/// Frames with this guid fail to render.
pub const BROKEN_GUID: Uuid = Uuid::from_u128(0xdead_beef);

fn png() -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 4, Rgb([200, 120, 40])));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

async fn render(Path((_recording_id, guid)): Path<(i64, Uuid)>) -> Response {
    if guid == BROKEN_GUID {
        return (StatusCode::INTERNAL_SERVER_ERROR, "render failed").into_response();
    }
    ([(header::CONTENT_TYPE, "image/png")], png()).into_response()
}

/// Serve a Horus stand-in on a random port; returns its `/web/` base URL.
pub async fn spawn_mock_horus() -> String {
    let app = Router::new()
        .route("/web/", route_get(|| async { "Horus Web Movie Player" }))
        .route("/web/images/{recording_id}/{guid}", route_get(render));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/web/")
}

pub fn horus_client(url: &str) -> HorusClient {
    HorusClient::new(&HorusConfig {
        url: url.to_string(),
        timeout_secs: 5,
        ..Default::default()
    })
    .unwrap()
}
