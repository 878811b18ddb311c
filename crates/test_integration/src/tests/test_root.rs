use crate::runner::context::test_context::TestContext;
use crate::test_helpers::api_url;
use color_eyre::Result;
use reqwest::StatusCode;
use serde_json::Value;

pub async fn test_health_endpoint(context: &TestContext) -> Result<()> {
    let response = context
        .http_client
        .get(api_url(context, "/health"))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await?;
    assert_eq!(body["status"], "OK");
    assert!(body["timestamp"].is_string());
    Ok(())
}
