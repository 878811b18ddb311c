use crate::runner::context::test_context::TestContext;
use crate::test_constants::{OTHER_EMAIL, OTHER_PASSWORD};
use crate::test_helpers::{api_url, login, send_webhook, upload_file_id, user_token};
use color_eyre::Result;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use serde_json::{Value, json};

pub async fn test_user_notes_and_download(context: &TestContext) -> Result<()> {
    let token = user_token(context).await?;
    let file_id = upload_file_id(context, Some(&token), "Checkup March.txt").await?;
    let response = send_webhook(
        context,
        &json!({
            "fileId": file_id,
            "status": "success",
            "noteType": "summary",
            "notes": { "summary": "Blood pressure normal" },
        }),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::OK);

    // Listing
    let listing: Value = context
        .http_client
        .get(api_url(context, "/api/notes/user"))
        .bearer_auth(&token)
        .send()
        .await?
        .json()
        .await?;
    let files = listing["files"].as_array().cloned().unwrap_or_default();
    let listed = files
        .iter()
        .find(|f| f["id"] == file_id)
        .cloned()
        .unwrap_or_default();
    assert_eq!(listed["status"], "processed");
    assert_eq!(listed["notes"][0]["type"], "summary");
    assert_eq!(listed["notes"][0]["content"]["summary"], "Blood pressure normal");
    assert!(listing["pagination"]["total"].as_i64().unwrap_or_default() >= 1);

    // File notes
    let file_notes: Value = context
        .http_client
        .get(api_url(context, &format!("/api/notes/file/{file_id}")))
        .bearer_auth(&token)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(file_notes["file"]["originalName"], "Checkup March.txt");
    let note_id = file_notes["notes"][0]["id"].as_i64().unwrap_or_default();
    assert!(note_id > 0);

    // Download
    let download = context
        .http_client
        .get(api_url(context, &format!("/api/notes/download/{note_id}")))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(download.status(), StatusCode::OK);
    let content_type = download
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned();
    assert!(content_type.starts_with("text/plain"));
    let disposition = download
        .headers()
        .get(CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned();
    assert!(disposition.starts_with("attachment; filename=\""));
    assert!(disposition.contains("_summary_"));
    assert!(disposition.ends_with(".txt\""));
    let text = download.text().await?;
    assert!(text.contains("File: Checkup March.txt"));
    assert!(text.contains("Type: summary"));
    assert!(text.contains("Blood pressure normal"));

    // Someone else's file and note do not exist for another user.
    let other = login(context, OTHER_EMAIL, OTHER_PASSWORD).await?;
    let response = context
        .http_client
        .get(api_url(context, &format!("/api/notes/file/{file_id}")))
        .bearer_auth(&other)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = context
        .http_client
        .get(api_url(context, &format!("/api/notes/download/{note_id}")))
        .bearer_auth(&other)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}
