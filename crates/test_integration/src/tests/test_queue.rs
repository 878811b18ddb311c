use crate::runner::context::test_context::TestContext;
use crate::test_helpers::{
    admin_token, api_url, file_and_task_status, jobs_for_file, run_worker_until_idle,
    stored_path, upload_file_id,
};
use color_eyre::Result;
use color_eyre::eyre::OptionExt;
use common_services::database::jobs::Job;
use common_types::queue::{JobState, QueueName};
use reqwest::StatusCode;
use serde_json::Value;

async fn processing_job(context: &TestContext, file_id: i32) -> Result<Job> {
    jobs_for_file(context, file_id)
        .await?
        .into_iter()
        .find(|job| job.name == "process-file")
        .ok_or_eyre("File has no process-file job")
}

pub async fn test_retry_resets_task(context: &TestContext) -> Result<()> {
    let admin = admin_token(context).await?;
    let file_id = upload_file_id(context, None, "retry-me.txt").await?;
    tokio::fs::remove_file(stored_path(context, file_id).await?).await?;
    let job = processing_job(context, file_id).await?;
    sqlx::query("UPDATE jobs SET max_attempts = 1 WHERE id = $1")
        .bind(job.id)
        .execute(&context.pool)
        .await?;

    run_worker_until_idle(context, &context.settings, vec![QueueName::FileProcessing]).await?;
    assert_eq!(processing_job(context, file_id).await?.status, JobState::Failed);
    let (_, task_status, _) = file_and_task_status(context, file_id).await?;
    assert_eq!(task_status.as_deref(), Some("failed"));

    let retry_url = api_url(
        context,
        &format!("/api/queue/job/file-processing/{}/retry", job.id),
    );
    let response = context
        .http_client
        .post(&retry_url)
        .bearer_auth(&admin)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["message"], "Job retry initiated successfully");

    let retried = processing_job(context, file_id).await?;
    assert_eq!(retried.status, JobState::Waiting);
    assert_eq!(retried.attempts_made, 0);
    assert_eq!(retried.failed_reason, None);
    let (attempts, task_status): (i32, String) = sqlx::query_as(
        "SELECT attempts, status::text FROM task WHERE file_id = $1",
    )
    .bind(file_id)
    .fetch_one(&context.pool)
    .await?;
    assert_eq!(task_status, "pending");
    assert_eq!(attempts, 0);

    // Only failed jobs can be retried.
    let again = context
        .http_client
        .post(&retry_url)
        .bearer_auth(&admin)
        .send()
        .await?;
    assert_eq!(again.status(), StatusCode::BAD_REQUEST);

    // Wrong queue for the job.
    let elsewhere = context
        .http_client
        .post(api_url(
            context,
            &format!("/api/queue/job/note-generation/{}/retry", job.id),
        ))
        .bearer_auth(&admin)
        .send()
        .await?;
    assert_eq!(elsewhere.status(), StatusCode::NOT_FOUND);
    Ok(())
}

pub async fn test_remove_job_cancels_task(context: &TestContext) -> Result<()> {
    let admin = admin_token(context).await?;
    let file_id = upload_file_id(context, None, "removed.txt").await?;
    let job = processing_job(context, file_id).await?;
    let job_url = api_url(context, &format!("/api/queue/job/file-processing/{}", job.id));

    let response = context
        .http_client
        .get(&job_url)
        .bearer_auth(&admin)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["job"]["name"], "process-file");
    assert_eq!(body["job"]["data"]["fileId"], file_id);
    assert_eq!(body["job"]["opts"]["backoff"]["type"], "exponential");

    let response = context
        .http_client
        .delete(&job_url)
        .bearer_auth(&admin)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let (file_status, task_status, _) = file_and_task_status(context, file_id).await?;
    assert_eq!(file_status, "uploaded");
    assert_eq!(task_status.as_deref(), Some("cancelled"));

    let gone = context
        .http_client
        .get(&job_url)
        .bearer_auth(&admin)
        .send()
        .await?;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);

    let not_a_number = context
        .http_client
        .get(api_url(context, "/api/queue/job/file-processing/abc"))
        .bearer_auth(&admin)
        .send()
        .await?;
    assert_eq!(not_a_number.status(), StatusCode::NOT_FOUND);
    Ok(())
}

pub async fn test_pause_and_resume(context: &TestContext) -> Result<()> {
    let admin = admin_token(context).await?;
    let control = |action: &str| {
        context
            .http_client
            .post(api_url(context, &format!("/api/queue/file-processing/{action}")))
            .bearer_auth(&admin)
            .send()
    };

    let response = control("pause").await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["message"], "file-processing queue paused successfully");

    let file_id = upload_file_id(context, None, "paused.txt").await?;
    run_worker_until_idle(context, &context.settings, vec![QueueName::FileProcessing]).await?;
    assert_eq!(processing_job(context, file_id).await?.status, JobState::Waiting);

    let status: Value = context
        .http_client
        .get(api_url(context, "/api/queue/status"))
        .bearer_auth(&admin)
        .send()
        .await?
        .json()
        .await?;
    let counts = &status["fileProcessingQueue"]["counts"];
    assert!(counts["paused"].as_i64().unwrap_or_default() >= 1);
    assert_eq!(counts["waiting"], 0);

    assert_eq!(control("resume").await?.status(), StatusCode::OK);
    run_worker_until_idle(context, &context.settings, vec![QueueName::FileProcessing]).await?;
    assert_eq!(processing_job(context, file_id).await?.status, JobState::Completed);
    let (file_status, _, _) = file_and_task_status(context, file_id).await?;
    assert_eq!(file_status, "ready_for_notes");
    Ok(())
}

pub async fn test_queue_listing(context: &TestContext) -> Result<()> {
    let admin = admin_token(context).await?;

    let status: Value = context
        .http_client
        .get(api_url(context, "/api/queue/status"))
        .bearer_auth(&admin)
        .send()
        .await?
        .json()
        .await?;
    for queue in [
        "fileProcessingQueue",
        "noteGenerationQueue",
        "fileForwardingQueue",
    ] {
        assert!(status[queue]["counts"].is_object(), "{queue} has no counts");
    }
    assert!(
        status["databaseTasks"]["file_processing"]["completed"]
            .as_i64()
            .unwrap_or_default()
            >= 1
    );

    let listing: Value = context
        .http_client
        .get(api_url(context, "/api/queue/file-processing/jobs"))
        .query(&[("state", "completed"), ("limit", "2")])
        .bearer_auth(&admin)
        .send()
        .await?
        .json()
        .await?;
    let jobs = listing["jobs"].as_array().cloned().unwrap_or_default();
    assert!(!jobs.is_empty() && jobs.len() <= 2);
    assert!(jobs.iter().all(|job| job["status"] == "completed"));
    assert_eq!(listing["pagination"]["limit"], 2);

    let invalid = context
        .http_client
        .get(api_url(context, "/api/queue/transcoding/jobs"))
        .bearer_auth(&admin)
        .send()
        .await?;
    assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
    let body: Value = invalid.json().await?;
    assert_eq!(body["error"], "Invalid queue name");

    let bad_state = context
        .http_client
        .get(api_url(context, "/api/queue/file-processing/jobs"))
        .query(&[("state", "finished")])
        .bearer_auth(&admin)
        .send()
        .await?;
    assert_eq!(bad_state.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

pub async fn test_clear_completed(context: &TestContext) -> Result<()> {
    let admin = admin_token(context).await?;
    let response = context
        .http_client
        .delete(api_url(context, "/api/queue/file-processing/clear-completed"))
        .bearer_auth(&admin)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert!(body["clearedCount"].as_u64().unwrap_or_default() >= 1);

    let remaining: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM jobs WHERE queue = 'file_processing' AND status = 'completed'",
    )
    .fetch_one(&context.pool)
    .await?;
    assert_eq!(remaining, 0);

    // Failed jobs are kept.
    let failed: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM jobs WHERE queue = 'file_processing' AND status = 'failed'",
    )
    .fetch_one(&context.pool)
    .await?;
    let cleared_failed: Value = context
        .http_client
        .delete(api_url(context, "/api/queue/file-processing/clear-failed"))
        .bearer_auth(&admin)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(cleared_failed["clearedCount"], failed);
    Ok(())
}
