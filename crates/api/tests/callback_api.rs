//! Integration tests for the callback ingress: shared-secret auth,
//! finalization, and idempotent terminal writes.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;

use common::TEST_CALLBACK_SECRET;
use relay_core::kind::Kind;
use relay_core::status::JobStatus;
use relay_db::repositories::JobRepo;

#[sqlx::test(migrations = "../../migrations")]
async fn callback_without_secret_is_unauthorized(pool: PgPool) {
    let job = JobRepo::create(&pool, 1, Kind::Chat, None, &json!({}))
        .await
        .unwrap();
    JobRepo::mark_processing(&pool, job.id).await.unwrap();

    let app = common::build_test_app(pool.clone());
    let response = common::callback_post(
        app,
        None,
        &json!({ "job_id": job.id, "result": "hello back" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // The job row must be untouched.
    let row = JobRepo::find_by_id(&pool, job.id).await.unwrap().unwrap();
    assert_eq!(row.status_id, JobStatus::Processing.id());
    assert!(row.result.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn callback_with_wrong_secret_is_unauthorized(pool: PgPool) {
    let job = JobRepo::create(&pool, 1, Kind::Chat, None, &json!({}))
        .await
        .unwrap();

    let app = common::build_test_app(pool);
    let response = common::callback_post(
        app,
        Some("not-the-secret"),
        &json!({ "job_id": job.id, "result": "x" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../migrations")]
async fn result_callback_completes_job(pool: PgPool) {
    let job = JobRepo::create(&pool, 1, Kind::Chat, None, &json!({"text": "hi"}))
        .await
        .unwrap();
    JobRepo::mark_processing(&pool, job.id).await.unwrap();

    let app = common::build_test_app(pool.clone());
    let response = common::callback_post(
        app,
        Some(TEST_CALLBACK_SECRET),
        &json!({ "job_id": job.id, "result": "hello back" }),
    )
    .await;

    let body = common::expect_status(response, StatusCode::OK).await;
    assert_eq!(body["data"]["status_id"], JobStatus::Completed.id());
    assert_eq!(body["data"]["result"], "hello back");
    assert!(!body["data"]["completed_at"].is_null());
}

#[sqlx::test(migrations = "../../migrations")]
async fn error_callback_fails_job(pool: PgPool) {
    let job = JobRepo::create(&pool, 1, Kind::FileUpload, None, &json!({}))
        .await
        .unwrap();
    JobRepo::mark_processing(&pool, job.id).await.unwrap();

    let app = common::build_test_app(pool.clone());
    let response = common::callback_post(
        app,
        Some(TEST_CALLBACK_SECRET),
        &json!({ "job_id": job.id, "error": "ingestion blew up" }),
    )
    .await;

    let body = common::expect_status(response, StatusCode::OK).await;
    assert_eq!(body["data"]["status_id"], JobStatus::Failed.id());
    assert_eq!(body["data"]["error_message"], "ingestion blew up");
}

#[sqlx::test(migrations = "../../migrations")]
async fn duplicate_callback_keeps_first_result(pool: PgPool) {
    let job = JobRepo::create(&pool, 1, Kind::Chat, None, &json!({}))
        .await
        .unwrap();
    JobRepo::mark_processing(&pool, job.id).await.unwrap();

    let app = common::build_test_app(pool.clone());

    let first = common::callback_post(
        app.clone(),
        Some(TEST_CALLBACK_SECRET),
        &json!({ "job_id": job.id, "result": "first" }),
    )
    .await;
    common::expect_status(first, StatusCode::OK).await;

    // A second delivery with a different payload is acknowledged but
    // must not overwrite the stored result.
    let second = common::callback_post(
        app,
        Some(TEST_CALLBACK_SECRET),
        &json!({ "job_id": job.id, "result": "second" }),
    )
    .await;
    let body = common::expect_status(second, StatusCode::OK).await;
    assert_eq!(body["data"]["result"], "first");

    let row = JobRepo::find_by_id(&pool, job.id).await.unwrap().unwrap();
    assert_eq!(row.result, Some(json!("first")));
}

#[sqlx::test(migrations = "../../migrations")]
async fn unknown_job_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = common::callback_post(
        app,
        Some(TEST_CALLBACK_SECRET),
        &json!({ "job_id": 424242, "result": "x" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../migrations")]
async fn result_and_error_are_mutually_exclusive(pool: PgPool) {
    let job = JobRepo::create(&pool, 1, Kind::Chat, None, &json!({}))
        .await
        .unwrap();

    let app = common::build_test_app(pool);

    let both = common::callback_post(
        app.clone(),
        Some(TEST_CALLBACK_SECRET),
        &json!({ "job_id": job.id, "result": "x", "error": "y" }),
    )
    .await;
    assert_eq!(both.status(), StatusCode::BAD_REQUEST);

    let neither = common::callback_post(
        app,
        Some(TEST_CALLBACK_SECRET),
        &json!({ "job_id": job.id }),
    )
    .await;
    assert_eq!(neither.status(), StatusCode::BAD_REQUEST);
}
