//! Shared helpers for API integration tests.
//!
//! Not every test binary uses every helper.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use relay_api::auth::jwt::{generate_access_token, JwtConfig};
use relay_api::config::ServerConfig;
use relay_api::engine::{PgDestinationResolver, WebhookDispatcher};
use relay_api::middleware::callback::CALLBACK_SECRET_HEADER;
use relay_api::router::build_app_router;
use relay_api::state::AppState;
use relay_core::types::DbId;

/// Callback secret used by every test app.
pub const TEST_CALLBACK_SECRET: &str = "test-callback-secret";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
        callback_secret: TEST_CALLBACK_SECRET.to_string(),
    }
}

/// Build the full application router with all middleware layers, using
/// the given database pool.
///
/// This mirrors the router construction in `main.rs` so integration
/// tests exercise the same middleware stack that production uses.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let resolver = Arc::new(PgDestinationResolver::new(pool.clone()));
    let dispatcher = Arc::new(WebhookDispatcher::new(resolver));

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        dispatcher,
    };

    build_app_router(state, &config)
}

/// Mint an access token for the given user against the test JWT secret.
pub fn mint_token(user_id: DbId, role: &str) -> String {
    generate_access_token(user_id, role, &test_config().jwt)
        .expect("token generation should succeed")
}

/// Send an unauthenticated GET request.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send a GET request with a Bearer token.
pub async fn auth_get(app: Router, uri: &str, token: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header("authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send a JSON request, optionally with a Bearer token.
pub async fn send_json(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: &serde_json::Value,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }

    app.oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

/// Send a callback POST, optionally with the shared-secret header.
pub async fn callback_post(
    app: Router,
    secret: Option<&str>,
    body: &serde_json::Value,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/callbacks")
        .header("content-type", "application/json");
    if let Some(secret) = secret {
        builder = builder.header(CALLBACK_SECRET_HEADER, secret);
    }

    app.oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

/// Read a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("failed to read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}

/// Assert a response status and return the parsed body.
pub async fn expect_status(
    response: Response<Body>,
    expected: StatusCode,
) -> serde_json::Value {
    let status = response.status();
    let body = body_json(response).await;
    assert_eq!(status, expected, "unexpected status, body: {body}");
    body
}
