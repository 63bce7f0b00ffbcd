//! Settings, session and request-validation behaviour that needs no database.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, post_json, put_json};
use serde_json::json;

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[tokio::test]
async fn config_update_is_redacted_and_persisted() {
    let state = common::test_state();

    let response = put_json(
        common::build_test_app(state.clone()),
        "/api/v1/config",
        json!({
            "database": {"host": "db.local", "dbname": "catalog", "user": "reader", "password": "hunter2"},
            "horus": {"url": "http://horus.local/web/", "username": "viewer", "password": "secret"}
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(!json.to_string().contains("hunter2"));
    assert!(!json.to_string().contains("secret"));
    assert_eq!(json["data"]["database"]["database"], "catalog");
    assert_eq!(json["data"]["database"]["password_set"], true);
    assert_eq!(json["data"]["horus"]["password_set"], true);

    let json = body_json(get(common::build_test_app(state.clone()), "/api/v1/config").await).await;
    assert_eq!(json["data"]["database"]["host"], "db.local");
    assert_eq!(json["data"]["database"]["port"], "5432");

    let settings = state.settings_snapshot().await;
    assert_eq!(settings.database.password, "hunter2");
    assert_eq!(settings.horus.username.as_deref(), Some("viewer"));
}

#[tokio::test]
async fn empty_config_update_is_rejected() {
    let app = common::build_test_app(common::test_state());
    let response = put_json(app, "/api/v1/config", json!({})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn invalid_horus_url_leaves_settings_unchanged() {
    let state = common::test_state();
    let response = put_json(
        common::build_test_app(state.clone()),
        "/api/v1/config",
        json!({"horus": {"url": "ftp://horus.local"}}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    assert_eq!(state.settings_snapshot().await.horus.url, "http://localhost:5050/web/");
}

// ---------------------------------------------------------------------------
// Session lifecycle without a reachable database
// ---------------------------------------------------------------------------

#[tokio::test]
async fn connect_names_every_missing_field() {
    let app = common::build_test_app(common::test_state());
    let response = post_json(app, "/api/v1/connect", json!({"database": {"password": "x"}})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["details"]["fields"], json!(["host", "database", "user"]));
}

#[tokio::test]
async fn connect_to_closed_port_reports_network_stage() {
    let port = common::closed_port().await;

    let state = common::test_state();
    let response = post_json(
        common::build_test_app(state.clone()),
        "/api/v1/connect",
        json!({"database": {"host": "127.0.0.1", "port": port.to_string(), "database": "catalog", "user": "reader"}}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["database_connected"], false);
    assert_eq!(data["horus_connected"], false);
    assert_eq!(data["diagnostics"]["database"]["connected"], false);
    assert_eq!(data["diagnostics"]["database"]["stage"], "network");
    assert_eq!(data["diagnostics"]["database"]["report"]["failures"][0]["variant"], "tcp connect");
    assert_eq!(data["diagnostics"]["horus"]["connected"], false);
    assert!(state.session.current().await.is_none());
}

#[tokio::test]
async fn disconnect_without_session_succeeds() {
    let app = common::build_test_app(common::test_state());
    let response = post_json(app, "/api/v1/disconnect", json!({})).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["disconnected"], json!([]));
}

#[tokio::test]
async fn test_db_rejects_incomplete_settings() {
    let app = common::build_test_app(common::test_state());
    let response = post_json(app, "/api/v1/test-db", json!({"host": "db.local"})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["details"]["fields"], json!(["database", "user"]));
}

// ---------------------------------------------------------------------------
// Session-bound endpoints
// ---------------------------------------------------------------------------

#[tokio::test]
async fn catalog_endpoints_require_a_session() {
    let state = common::test_state();
    for uri in ["/api/v1/recordings", "/api/v1/recordings/locate?key=R", "/api/v1/debug-db"] {
        let response = get(common::build_test_app(state.clone()), uri).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE, "{uri}");
        assert_eq!(body_json(response).await["code"], "NOT_CONNECTED");
    }
}

#[tokio::test]
async fn image_requests_are_validated_before_session_checks() {
    let state = common::test_state();

    let response = post_json(
        common::build_test_app(state.clone()),
        "/api/v1/images",
        json!({"recording_endpoint": "R", "count": -1}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(
        common::build_test_app(state.clone()),
        "/api/v1/images",
        json!({"recording_endpoint": "R", "width": 0}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(common::build_test_app(state.clone()), "/api/v1/image/Ladybug5plus").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(
        common::build_test_app(state.clone()),
        "/api/v1/image/Ladybug5plus/yesterday",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(
        common::build_test_app(state),
        "/api/v1/images",
        json!({"recording_endpoint": "R"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
