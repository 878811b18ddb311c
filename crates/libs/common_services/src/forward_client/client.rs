use super::error::ForwardError;
use app_state::IntegrationSettings;
use common_types::ForwardFilePayload;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Posts upload notifications to the configured external webhook.
#[derive(Clone, Debug)]
pub struct ForwardClient {
    http_client: Client,
    target: Option<Url>,
}

impl ForwardClient {
    pub const fn new(http_client: Client, target: Option<Url>) -> Self {
        Self {
            http_client,
            target,
        }
    }

    /// Builds a client with the configured request timeout. A blank URL yields an
    /// unconfigured client that refuses to forward.
    pub fn from_settings(integrations: &IntegrationSettings) -> Result<Self, ForwardError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(integrations.request_timeout_secs))
            .build()?;
        let target = integrations.webhook_url().map(Url::parse).transpose()?;
        Ok(Self::new(http_client, target))
    }

    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.target.is_some()
    }

    /// Sends the upload's public location and metadata. Any non-2xx answer is an error.
    pub async fn forward_upload(&self, payload: &ForwardFilePayload) -> Result<(), ForwardError> {
        let target = self.target.as_ref().ok_or(ForwardError::NotConfigured)?;

        let response = self
            .http_client
            .post(target.clone())
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ForwardError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!("Forwarded file {} to {target}", payload.file_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::post;
    use color_eyre::Result;
    use tokio::net::TcpListener;

    fn payload() -> ForwardFilePayload {
        ForwardFilePayload {
            file_id: 12,
            file_url: "http://localhost:3001/uploads/1700000000000_abc.mp3".into(),
            original_name: "visit.mp3".into(),
            file_size: 2048,
            file_type: "audio/mpeg".into(),
            user_id: Some(1),
            timestamp: "2025-01-01T00:00:00Z".into(),
        }
    }

    async fn spawn_receiver(status: StatusCode) -> Result<Url> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = Router::new().route("/hook", post(move || async move { (status, "nope") }));
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });
        Ok(format!("http://{addr}/hook").parse()?)
    }

    #[tokio::test]
    async fn unconfigured_client_refuses_to_forward() {
        let client = ForwardClient::new(Client::new(), None);
        assert!(!client.is_configured());
        let result = client.forward_upload(&payload()).await;
        assert!(matches!(result, Err(ForwardError::NotConfigured)));
    }

    #[test]
    fn blank_url_in_settings_is_unconfigured() -> Result<()> {
        let client = ForwardClient::from_settings(&IntegrationSettings {
            external_webhook_url: Some(String::new()),
            request_timeout_secs: 1,
        })?;
        assert!(!client.is_configured());
        Ok(())
    }

    #[tokio::test]
    async fn successful_delivery() -> Result<()> {
        let url = spawn_receiver(StatusCode::OK).await?;
        let client = ForwardClient::new(Client::new(), Some(url));
        client.forward_upload(&payload()).await?;
        Ok(())
    }

    #[tokio::test]
    async fn non_success_status_is_reported_with_body() -> Result<()> {
        let url = spawn_receiver(StatusCode::BAD_GATEWAY).await?;
        let client = ForwardClient::new(Client::new(), Some(url));

        let result = client.forward_upload(&payload()).await;

        match result {
            Err(ForwardError::Rejected { status, body }) => {
                assert_eq!(status, 502);
                assert_eq!(body, "nope");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
        Ok(())
    }
}
