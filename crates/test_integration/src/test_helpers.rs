use crate::runner::context::test_context::TestContext;
use crate::test_constants::{USER_EMAIL, USER_PASSWORD};
use app_state::AppSettings;
use color_eyre::Result;
use color_eyre::eyre::{OptionExt, bail};
use common_services::database::jobs::Job;
use common_types::queue::QueueName;
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use serde_json::{Value, json};
use tokio::sync::watch;

pub fn api_url(context: &TestContext, path: &str) -> String {
    format!("{}{path}", context.settings.api.public_url)
}

/// Logs in and returns the bearer token.
pub async fn login(context: &TestContext, email: &str, password: &str) -> Result<String> {
    let response = context
        .http_client
        .post(api_url(context, "/api/auth/login"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await?;
    if response.status() != StatusCode::OK {
        bail!("Login of {email} failed with {}", response.status());
    }
    let body: Value = response.json().await?;
    body["token"]
        .as_str()
        .map(ToOwned::to_owned)
        .ok_or_eyre("Login response has no token")
}

pub async fn admin_token(context: &TestContext) -> Result<String> {
    login(
        context,
        &context.settings.secrets.admin_email,
        &context.settings.secrets.admin_password,
    )
    .await
}

/// Token of the regular account registered by the auth tests.
pub async fn user_token(context: &TestContext) -> Result<String> {
    login(context, USER_EMAIL, USER_PASSWORD).await
}

/// Uploads a small text file, returning the raw response.
pub async fn upload_text(
    context: &TestContext,
    token: Option<&str>,
    name: &str,
    contents: &str,
) -> Result<reqwest::Response> {
    let part = Part::bytes(contents.as_bytes().to_vec())
        .file_name(name.to_owned())
        .mime_str("text/plain")?;
    let mut request = context
        .http_client
        .post(api_url(context, "/api/upload"))
        .multipart(Form::new().part("file", part));
    if let Some(token) = token {
        request = request.bearer_auth(token);
    }
    Ok(request.send().await?)
}

/// Uploads a file and returns its id.
pub async fn upload_file_id(
    context: &TestContext,
    token: Option<&str>,
    name: &str,
) -> Result<i32> {
    let response = upload_text(context, token, name, "Patient reports mild headache.").await?;
    if response.status() != StatusCode::OK {
        bail!("Upload of {name} failed with {}", response.status());
    }
    let body: Value = response.json().await?;
    let id = body["file"]["id"].as_i64().ok_or_eyre("Upload has no file id")?;
    Ok(i32::try_from(id)?)
}

pub async fn send_webhook(context: &TestContext, payload: &Value) -> Result<reqwest::Response> {
    Ok(context
        .http_client
        .post(api_url(context, "/api/notes/webhook"))
        .json(payload)
        .send()
        .await?)
}

/// Runs a worker on `queues` until no job is runnable.
pub async fn run_worker_until_idle(
    context: &TestContext,
    settings: &AppSettings,
    queues: Vec<QueueName>,
) -> Result<()> {
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    worker::worker::create_worker(context.pool.clone(), settings.clone(), queues, true, shutdown_rx)
        .await
}

pub async fn jobs_for_file(context: &TestContext, file_id: i32) -> Result<Vec<Job>> {
    Ok(
        sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE payload ->> 'fileId' = $1 ORDER BY id")
            .bind(file_id.to_string())
            .fetch_all(&context.pool)
            .await?,
    )
}

/// `(file status, task status, task error)` as stored.
pub async fn file_and_task_status(
    context: &TestContext,
    file_id: i32,
) -> Result<(String, Option<String>, Option<String>)> {
    Ok(sqlx::query_as(
        r"
        SELECT f.status::text, t.status::text, t.error_message
        FROM uploaded_file f
        LEFT JOIN task t ON t.file_id = f.id AND t.task_type = 'file_processing'
        WHERE f.id = $1
        ",
    )
    .bind(file_id)
    .fetch_one(&context.pool)
    .await?)
}

/// Path of the stored bytes of a file.
pub async fn stored_path(context: &TestContext, file_id: i32) -> Result<String> {
    Ok(
        sqlx::query_scalar("SELECT file_path FROM uploaded_file WHERE id = $1")
            .bind(file_id)
            .fetch_one(&context.pool)
            .await?,
    )
}
