use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use super::NotifyError;
use crate::config::NotifyConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Serialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}

/// Hands a rendered email to a delivery backend and returns its response body.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<Value, NotifyError>;
}

/// Sends through the Resend HTTP API.
pub struct ResendMailer {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl ResendMailer {
    pub fn new(api_key: impl Into<String>, api_url: &str) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: format!("{}/emails", api_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<Value, NotifyError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(email)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(NotifyError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body).unwrap_or(Value::String(body)))
    }
}

/// Logs the email instead of sending it. Used when no API key is configured.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<Value, NotifyError> {
        tracing::info!(
            to = ?email.to,
            subject = %email.subject,
            "Email delivery disabled, not sending"
        );
        Ok(serde_json::json!({ "id": null, "delivered": false }))
    }
}

/// Picks the Resend mailer when an API key is configured, otherwise the log-only one.
pub fn mailer_from_config(config: &NotifyConfig) -> Result<Box<dyn Mailer>, NotifyError> {
    match config.resend_api_key.as_deref().filter(|k| !k.is_empty()) {
        Some(key) => Ok(Box::new(ResendMailer::new(key, &config.api_url)?)),
        None => {
            tracing::warn!("No email API key configured; notifications will only be logged");
            Ok(Box::new(LogMailer))
        }
    }
}
