//! Integration tests for `JobRepo`: creation, monotonic transitions, and
//! idempotent terminal writes.

use serde_json::json;
use sqlx::PgPool;

use relay_core::kind::Kind;
use relay_core::status::JobStatus;
use relay_db::models::job::JobListQuery;
use relay_db::repositories::JobRepo;

#[sqlx::test(migrations = "../../migrations")]
async fn create_starts_pending(pool: PgPool) {
    let job = JobRepo::create(&pool, 1, Kind::Chat, None, &json!({"text": "hi"}))
        .await
        .unwrap();

    assert_eq!(job.status_id, JobStatus::Pending.id());
    assert_eq!(job.kind, "chat");
    assert_eq!(job.submitted_by, 1);
    assert!(job.result.is_none());
    assert!(job.error_message.is_none());
    assert!(job.completed_at.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn mark_processing_only_from_pending(pool: PgPool) {
    let job = JobRepo::create(&pool, 1, Kind::Chat, None, &json!({}))
        .await
        .unwrap();

    assert!(JobRepo::mark_processing(&pool, job.id).await.unwrap());
    // Second attempt is a no-op: the job is no longer pending.
    assert!(!JobRepo::mark_processing(&pool, job.id).await.unwrap());

    let row = JobRepo::find_by_id(&pool, job.id).await.unwrap().unwrap();
    assert_eq!(row.status_id, JobStatus::Processing.id());
}

#[sqlx::test(migrations = "../../migrations")]
async fn complete_sets_result_and_timestamp(pool: PgPool) {
    let job = JobRepo::create(&pool, 1, Kind::Chat, None, &json!({}))
        .await
        .unwrap();
    JobRepo::mark_processing(&pool, job.id).await.unwrap();

    assert!(JobRepo::complete(&pool, job.id, &json!("hello back"))
        .await
        .unwrap());

    let row = JobRepo::find_by_id(&pool, job.id).await.unwrap().unwrap();
    assert_eq!(row.status_id, JobStatus::Completed.id());
    assert_eq!(row.result, Some(json!("hello back")));
    assert!(row.completed_at.is_some());
}

#[sqlx::test(migrations = "../../migrations")]
async fn terminal_writes_are_idempotent(pool: PgPool) {
    let job = JobRepo::create(&pool, 1, Kind::Chat, None, &json!({}))
        .await
        .unwrap();
    JobRepo::mark_processing(&pool, job.id).await.unwrap();

    assert!(JobRepo::complete(&pool, job.id, &json!("first"))
        .await
        .unwrap());

    // A second callback with a different payload must be rejected.
    assert!(!JobRepo::complete(&pool, job.id, &json!("second"))
        .await
        .unwrap());
    // So must a late failure report.
    assert!(!JobRepo::fail(&pool, job.id, "too late").await.unwrap());

    let row = JobRepo::find_by_id(&pool, job.id).await.unwrap().unwrap();
    assert_eq!(row.status_id, JobStatus::Completed.id());
    assert_eq!(row.result, Some(json!("first")));
    assert!(row.error_message.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn fail_sets_error_message(pool: PgPool) {
    let job = JobRepo::create(&pool, 1, Kind::FileUpload, None, &json!({}))
        .await
        .unwrap();
    JobRepo::mark_processing(&pool, job.id).await.unwrap();

    assert!(JobRepo::fail(&pool, job.id, "workflow exploded")
        .await
        .unwrap());

    let row = JobRepo::find_by_id(&pool, job.id).await.unwrap().unwrap();
    assert_eq!(row.status_id, JobStatus::Failed.id());
    assert_eq!(row.error_message.as_deref(), Some("workflow exploded"));
    assert!(row.result.is_none());
    assert!(row.completed_at.is_some());

    // Failed is terminal too: a late result must not resurrect the job.
    assert!(!JobRepo::complete(&pool, job.id, &json!("late"))
        .await
        .unwrap());
}

#[sqlx::test(migrations = "../../migrations")]
async fn listing_scopes_and_filters(pool: PgPool) {
    for _ in 0..3 {
        JobRepo::create(&pool, 1, Kind::Chat, None, &json!({}))
            .await
            .unwrap();
    }
    let other = JobRepo::create(&pool, 2, Kind::LeadValidation, None, &json!({}))
        .await
        .unwrap();
    JobRepo::mark_processing(&pool, other.id).await.unwrap();

    let mine = JobRepo::list_by_user(&pool, 1, &JobListQuery::default())
        .await
        .unwrap();
    assert_eq!(mine.len(), 3);
    assert!(mine.iter().all(|j| j.submitted_by == 1));

    let all = JobRepo::list_all(&pool, &JobListQuery::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 4);

    let processing = JobRepo::list_all(
        &pool,
        &JobListQuery {
            status_id: Some(JobStatus::Processing.id()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(processing.len(), 1);
    assert_eq!(processing[0].id, other.id);

    let lead = JobRepo::list_all(
        &pool,
        &JobListQuery {
            kind: Some(Kind::LeadValidation),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(lead.len(), 1);
}
