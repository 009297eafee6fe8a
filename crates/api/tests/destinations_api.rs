//! Integration tests for admin destination management.

mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;
use sqlx::PgPool;

use relay_core::roles::{ROLE_ADMIN, ROLE_MEMBER};

#[sqlx::test(migrations = "../../migrations")]
async fn destinations_require_admin_role(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = common::get(app.clone(), "/api/v1/admin/destinations").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let member = common::mint_token(7, ROLE_MEMBER);
    let response = common::auth_get(app, "/api/v1/admin/destinations", &member).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../migrations")]
async fn create_and_list_destinations(pool: PgPool) {
    let app = common::build_test_app(pool);
    let admin = common::mint_token(99, ROLE_ADMIN);

    let response = common::send_json(
        app.clone(),
        Method::POST,
        "/api/v1/admin/destinations",
        Some(&admin),
        &json!({
            "kind": "chat",
            "url": "https://flows.example.com/chat",
            "headers": { "x-flow-key": "k" },
            "timeout_secs": 90
        }),
    )
    .await;

    let body = common::expect_status(response, StatusCode::CREATED).await;
    assert_eq!(body["data"]["kind"], "chat");
    assert_eq!(body["data"]["timeout_secs"], 90);
    assert_eq!(body["data"]["is_enabled"], true);

    let response = common::auth_get(app, "/api/v1/admin/destinations", &admin).await;
    let body = common::expect_status(response, StatusCode::OK).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn second_enabled_destination_for_kind_conflicts(pool: PgPool) {
    let app = common::build_test_app(pool);
    let admin = common::mint_token(99, ROLE_ADMIN);

    let first = common::send_json(
        app.clone(),
        Method::POST,
        "/api/v1/admin/destinations",
        Some(&admin),
        &json!({ "kind": "chat", "url": "https://a.example.com" }),
    )
    .await;
    common::expect_status(first, StatusCode::CREATED).await;

    let second = common::send_json(
        app,
        Method::POST,
        "/api/v1/admin/destinations",
        Some(&admin),
        &json!({ "kind": "chat", "url": "https://b.example.com" }),
    )
    .await;
    let body = common::expect_status(second, StatusCode::CONFLICT).await;
    assert_eq!(body["code"], "CONFLICT");
}

#[sqlx::test(migrations = "../../migrations")]
async fn update_and_delete_destination(pool: PgPool) {
    let app = common::build_test_app(pool);
    let admin = common::mint_token(99, ROLE_ADMIN);

    let created = common::send_json(
        app.clone(),
        Method::POST,
        "/api/v1/admin/destinations",
        Some(&admin),
        &json!({ "kind": "google_drive", "url": "https://flows.example.com/drive" }),
    )
    .await;
    let body = common::expect_status(created, StatusCode::CREATED).await;
    let id = body["data"]["id"].as_i64().unwrap();

    let updated = common::send_json(
        app.clone(),
        Method::PUT,
        &format!("/api/v1/admin/destinations/{id}"),
        Some(&admin),
        &json!({ "is_enabled": false, "timeout_secs": 45 }),
    )
    .await;
    let body = common::expect_status(updated, StatusCode::OK).await;
    assert_eq!(body["data"]["is_enabled"], false);
    assert_eq!(body["data"]["timeout_secs"], 45);

    let deleted = common::send_json(
        app.clone(),
        Method::DELETE,
        &format!("/api/v1/admin/destinations/{id}"),
        Some(&admin),
        &json!({}),
    )
    .await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let gone = common::send_json(
        app,
        Method::PUT,
        &format!("/api/v1/admin/destinations/{id}"),
        Some(&admin),
        &json!({ "is_enabled": true }),
    )
    .await;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../migrations")]
async fn invalid_input_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let admin = common::mint_token(99, ROLE_ADMIN);

    let empty_url = common::send_json(
        app.clone(),
        Method::POST,
        "/api/v1/admin/destinations",
        Some(&admin),
        &json!({ "kind": "chat", "url": "   " }),
    )
    .await;
    assert_eq!(empty_url.status(), StatusCode::BAD_REQUEST);

    let bad_headers = common::send_json(
        app,
        Method::POST,
        "/api/v1/admin/destinations",
        Some(&admin),
        &json!({
            "kind": "chat",
            "url": "https://a.example.com",
            "headers": { "x-count": 3 }
        }),
    )
    .await;
    assert_eq!(bad_headers.status(), StatusCode::BAD_REQUEST);
}
