use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::json;
use thiserror::Error;
use tracing::info;

use crate::config::EmailConfig;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("email gateway credential not configured")]
    MissingCredential,
    #[error("email gateway request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("email gateway rejected message: {status} - {body}")]
    Rejected { status: StatusCode, body: String },
    #[error("email gateway did not answer within {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait EmailGateway: Send + Sync {
    /// False when the key is absent or blank; every send would fail. A key
    /// the provider refuses is still a credential and fails per recipient
    /// as `Rejected`.
    fn has_credential(&self) -> bool;

    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), GatewayError>;
}

/// Transactional email through the Brevo HTTP API.
pub struct BrevoGateway {
    client: Client,
    api_url: String,
    api_key: Option<String>,
    sender_name: String,
    sender_email: String,
}

impl BrevoGateway {
    pub fn new(config: &EmailConfig) -> Result<Self, GatewayError> {
        let client = Client::builder().timeout(config.send_timeout).build()?;
        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            sender_name: config.sender_name.clone(),
            sender_email: config.sender_email.clone(),
        })
    }
}

#[async_trait]
impl EmailGateway for BrevoGateway {
    fn has_credential(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), GatewayError> {
        let api_key = match self.api_key.as_deref() {
            Some(k) if !k.trim().is_empty() => k,
            _ => return Err(GatewayError::MissingCredential),
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("accept", "application/json")
            .header("api-key", api_key)
            .json(&json!({
                "sender": { "name": self.sender_name, "email": self.sender_email },
                "to": [{ "email": to }],
                "subject": subject,
                "textContent": body,
            }))
            .send()
            .await?;

        let status = response.status();
        if matches!(
            status,
            StatusCode::OK | StatusCode::CREATED | StatusCode::ACCEPTED
        ) {
            info!(recipient = to, "Email sent");
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(GatewayError::Rejected { status, body })
        }
    }
}
