//! Catalog endpoints against a migrated test database.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, insert_recording, post_json};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn recordings_are_listed_in_catalog_order(pool: PgPool) {
    let first = insert_recording(&pool, r"Rotterdam360\Ladybug5plus").await;
    let second = insert_recording(&pool, "Delft/Ladybug5").await;
    let state = common::connected_state(pool, None).await;

    let response = get(common::build_test_app(state), "/api/v1/recordings").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["id"], first);
    assert_eq!(data[0]["endpoint"], r"Rotterdam360\Ladybug5plus");
    assert_eq!(data[0]["name"], "Ladybug5plus");
    assert_eq!(data[1]["id"], second);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn locate_reports_strategy_and_attempts(pool: PgPool) {
    let id = insert_recording(&pool, r"A\B\C").await;
    let state = common::connected_state(pool, None).await;

    let response = get(common::build_test_app(state), "/api/v1/recordings/locate?key=C").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["recording"]["id"], id);
    assert_eq!(json["data"]["strategy"], "trailing_segment");
    assert_eq!(json["data"]["attempts"][0]["strategy"], "exact_path");
    assert_eq!(json["data"]["attempts"][0]["matches"], 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn locate_miss_returns_404_with_attempts(pool: PgPool) {
    insert_recording(&pool, r"A\B\C").await;
    let state = common::connected_state(pool, None).await;

    let response = get(common::build_test_app(state), "/api/v1/recordings/locate?key=Nowhere").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["details"]["attempts"].as_array().unwrap().len(), 4);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn blank_key_is_a_validation_error(pool: PgPool) {
    let state = common::connected_state(pool, None).await;

    let response = get(common::build_test_app(state), "/api/v1/recordings/locate?key=%20").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn debug_db_summarises_the_catalog(pool: PgPool) {
    for i in 0..3 {
        insert_recording(&pool, &format!(r"Batch\Rec{i}")).await;
    }
    let state = common::connected_state(pool, None).await;

    let json = body_json(get(common::build_test_app(state), "/api/v1/debug-db").await).await;
    assert_eq!(json["data"]["recordings_count"], 3);
    assert_eq!(json["data"]["sample_recordings"].as_array().unwrap().len(), 3);
    let tables = json["data"]["tables"].as_array().unwrap();
    assert!(tables.iter().any(|t| t == "frames"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn images_need_a_horus_connection(pool: PgPool) {
    insert_recording(&pool, r"A\B\C").await;
    let state = common::connected_state(pool, None).await;

    let response = post_json(
        common::build_test_app(state),
        "/api/v1/images",
        json!({"recording_endpoint": "C"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["code"], "NOT_CONNECTED");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn disconnect_drops_the_session(pool: PgPool) {
    let state = common::connected_state(pool, None).await;

    let response = post_json(common::build_test_app(state.clone()), "/api/v1/disconnect", json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["disconnected"], json!(["database"]));

    let response = get(common::build_test_app(state), "/api/v1/recordings").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
