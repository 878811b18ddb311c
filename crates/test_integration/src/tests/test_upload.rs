use crate::runner::context::test_context::TestContext;
use crate::test_constants::{OTHER_EMAIL, OTHER_PASSWORD};
use crate::test_helpers::{
    api_url, file_and_task_status, jobs_for_file, login, stored_path, upload_file_id,
    upload_text, user_token,
};
use color_eyre::Result;
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use std::path::Path;

pub async fn test_anonymous_upload(context: &TestContext) -> Result<()> {
    let response = upload_text(context, None, "visit notes.txt", "Follow-up in two weeks.").await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await?;
    assert_eq!(body["message"], "File uploaded successfully");
    assert_eq!(body["file"]["originalName"], "visit notes.txt");
    assert_eq!(body["file"]["fileType"], "text/plain");
    assert_eq!(body["file"]["status"], "uploaded");
    let stored_name = body["file"]["filename"].as_str().unwrap_or_default();
    assert!(stored_name.ends_with(".txt"));
    assert!(!stored_name.contains(' '));

    let file_id = i32::try_from(body["file"]["id"].as_i64().unwrap_or_default())?;
    let (file_status, task_status, _) = file_and_task_status(context, file_id).await?;
    assert_eq!(file_status, "uploaded");
    assert_eq!(task_status.as_deref(), Some("pending"));

    let jobs = jobs_for_file(context, file_id).await?;
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].name, "process-file");
    assert!(Path::new(&stored_path(context, file_id).await?).exists());

    let response = context
        .http_client
        .get(api_url(context, &format!("/api/upload/status/{file_id}")))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let status: Value = response.json().await?;
    assert_eq!(status["id"], file_id);
    assert_eq!(status["taskStatus"], "pending");
    Ok(())
}

pub async fn test_rejected_upload_leaves_nothing(context: &TestContext) -> Result<()> {
    let (files_before,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM uploaded_file")
        .fetch_one(&context.pool)
        .await?;

    let part = Part::bytes(b"MZ\x90\x00".to_vec())
        .file_name("setup.exe")
        .mime_str("application/x-msdownload")?;
    let response = context
        .http_client
        .post(api_url(context, "/api/upload"))
        .multipart(Form::new().part("file", part))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(body["error"], "Invalid file type");

    let (files_after,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM uploaded_file")
        .fetch_one(&context.pool)
        .await?;
    assert_eq!(files_before, files_after);
    assert_eq!(
        std::fs::read_dir(&context.settings.uploads.temp_dir)?.count(),
        0
    );
    Ok(())
}

pub async fn test_status_is_owner_only(context: &TestContext) -> Result<()> {
    let token = user_token(context).await?;
    let file_id = upload_file_id(context, Some(&token), "owned.txt").await?;
    let status_url = api_url(context, &format!("/api/upload/status/{file_id}"));

    let owner = context
        .http_client
        .get(&status_url)
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(owner.status(), StatusCode::OK);

    let anonymous = context.http_client.get(&status_url).send().await?;
    assert_eq!(anonymous.status(), StatusCode::NOT_FOUND);

    let other = login(context, OTHER_EMAIL, OTHER_PASSWORD).await?;
    let response = context
        .http_client
        .get(&status_url)
        .bearer_auth(&other)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}

pub async fn test_delete_upload(context: &TestContext) -> Result<()> {
    let token = user_token(context).await?;
    let file_id = upload_file_id(context, Some(&token), "to-delete.txt").await?;
    let path = stored_path(context, file_id).await?;
    let url = api_url(context, &format!("/api/upload/{file_id}"));

    let anonymous = context.http_client.delete(&url).send().await?;
    assert_eq!(anonymous.status(), StatusCode::NOT_FOUND);

    let response = context
        .http_client
        .delete(&url)
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let (remaining,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM uploaded_file WHERE id = $1")
        .bind(file_id)
        .fetch_one(&context.pool)
        .await?;
    assert_eq!(remaining, 0);
    assert!(jobs_for_file(context, file_id).await?.is_empty());
    assert!(!Path::new(&path).exists());
    Ok(())
}
