//! Integration tests for the health check endpoint and general HTTP behaviour.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, get};
use sqlx::PgPool;
use tower::ServiceExt;

#[tokio::test]
async fn health_without_session_is_degraded() {
    let app = common::build_test_app(common::test_state());
    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    assert!(json["version"].is_string());
    assert_eq!(json["database_connected"], false);
    assert_eq!(json["horus_connected"], false);
    assert_eq!(json["config"]["database"]["password_set"], false);
    assert_eq!(json["config"]["horus"]["url"], "http://localhost:5050/web/");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn health_with_live_session_is_ok(pool: PgPool) {
    let state = common::connected_state(pool, None).await;
    let json = body_json(get(common::build_test_app(state), "/health").await).await;

    assert_eq!(json["status"], "ok");
    assert_eq!(json["database_connected"], true);
    assert_eq!(json["horus_connected"], false);
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let app = common::build_test_app(common::test_state());
    let response = get(app, "/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn response_contains_x_request_id_header() {
    let app = common::build_test_app(common::test_state());
    let response = get(app, "/health").await;

    let request_id = response.headers().get("x-request-id");
    assert!(
        request_id.is_some(),
        "Response must contain an x-request-id header"
    );
    let id_str = request_id.unwrap().to_str().unwrap();
    assert_eq!(id_str.len(), 36, "x-request-id should be a UUID string");
}

#[tokio::test]
async fn cors_preflight_allows_configured_origin() {
    let app = common::build_test_app(common::test_state());

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/v1/config")
        .header("Origin", "http://localhost:5001")
        .header("Access-Control-Request-Method", "PUT")
        .header("Access-Control-Request-Headers", "content-type")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost:5001")
    );
}
