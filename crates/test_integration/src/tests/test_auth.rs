use crate::runner::context::test_context::TestContext;
use crate::test_constants::{
    NEW_PASSWORD, OTHER_EMAIL, OTHER_PASSWORD, USER_EMAIL, USER_PASSWORD,
};
use crate::test_helpers::{admin_token, api_url, login, user_token};
use color_eyre::Result;
use reqwest::StatusCode;
use serde_json::{Value, json};

pub async fn test_register(context: &TestContext) -> Result<()> {
    for (email, password) in [(USER_EMAIL, USER_PASSWORD), (OTHER_EMAIL, OTHER_PASSWORD)] {
        let response = context
            .http_client
            .post(api_url(context, "/api/auth/register"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body: Value = response.json().await?;
        assert_eq!(body["user"]["email"], email);
        assert_eq!(body["user"]["role"], "user");
    }
    Ok(())
}

pub async fn test_second_register_attempt(context: &TestContext) -> Result<()> {
    let response = context
        .http_client
        .post(api_url(context, "/api/auth/register"))
        .json(&json!({ "email": USER_EMAIL.to_uppercase(), "password": "whatever1" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body: Value = response.json().await?;
    assert_eq!(body["error"], "A user with this email already exists");
    Ok(())
}

pub async fn test_login(context: &TestContext) -> Result<()> {
    let token = user_token(context).await?;

    let response = context
        .http_client
        .get(api_url(context, "/api/auth/verify"))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await?;
    assert_eq!(body["valid"], true);
    assert_eq!(body["user"]["email"], USER_EMAIL);
    Ok(())
}

pub async fn test_wrong_password(context: &TestContext) -> Result<()> {
    let response = context
        .http_client
        .post(api_url(context, "/api/auth/login"))
        .json(&json!({ "email": USER_EMAIL, "password": "not-the-password" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: Value = response.json().await?;
    assert_eq!(body["error"], "Invalid credentials");
    Ok(())
}

pub async fn test_user_is_not_admin(context: &TestContext) -> Result<()> {
    let token = user_token(context).await?;
    let response = context
        .http_client
        .get(api_url(context, "/api/admin/stats"))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    Ok(())
}

pub async fn test_change_password(context: &TestContext) -> Result<()> {
    let admin = admin_token(context).await?;
    let change = |password: &str| {
        context
            .http_client
            .post(api_url(context, "/api/auth/change-password"))
            .bearer_auth(&admin)
            .json(&json!({ "email": USER_EMAIL, "password": password }))
            .send()
    };

    assert_eq!(change(NEW_PASSWORD).await?.status(), StatusCode::OK);
    assert!(login(context, USER_EMAIL, USER_PASSWORD).await.is_err());
    login(context, USER_EMAIL, NEW_PASSWORD).await?;

    // Later tests log in with the original password.
    assert_eq!(change(USER_PASSWORD).await?.status(), StatusCode::OK);
    login(context, USER_EMAIL, USER_PASSWORD).await?;
    Ok(())
}
