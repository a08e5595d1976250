//! Webhook handoff
//!
//! POSTs a JSON notification, including the document text, to an HTTP
//! endpoint. Any non-2xx response fails the handoff.

use super::{HandoffNotifier, ReadyFile};
use crate::config::{HandoffConfig, SecretString};
use crate::domain::{Result, SddError};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct Notification<'a> {
    filename: &'a str,
    message_id: &'a str,
    checksum: &'a str,
    upload: bool,
    document: String,
}

/// Notifier that calls an HTTP endpoint
pub struct WebhookNotifier {
    client: Client,
    url: String,
    token: Option<SecretString>,
}

impl WebhookNotifier {
    /// Build a notifier from handoff configuration
    ///
    /// # Errors
    ///
    /// Returns an error if no URL is configured or the client cannot be built.
    pub fn new(config: &HandoffConfig) -> Result<Self> {
        let url = config
            .webhook_url
            .clone()
            .ok_or_else(|| SddError::Configuration("handoff.webhook_url is not set".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.timeout_seconds.min(10)))
            .build()
            .map_err(|e| SddError::Handoff(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url,
            token: config.webhook_token.clone(),
        })
    }
}

#[async_trait]
impl HandoffNotifier for WebhookNotifier {
    async fn file_ready(&self, file: &ReadyFile) -> Result<()> {
        let document = tokio::fs::read_to_string(&file.path).await.map_err(|e| {
            SddError::Handoff(format!("Failed to read {}: {}", file.filename, e))
        })?;

        let body = Notification {
            filename: &file.filename,
            message_id: &file.message_id,
            checksum: &file.checksum,
            upload: file.upload,
            document,
        };

        let mut request = self.client.post(&self.url).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret().as_ref());
        }

        let resp = request
            .send()
            .await
            .map_err(|e| SddError::Handoff(format!("Webhook request failed: {}", e)))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(SddError::Handoff(format!(
                "Webhook rejected {} with {}: {}",
                file.filename, status, text
            )));
        }

        tracing::info!(file = %file.filename, upload = file.upload, "Webhook notified");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "webhook"
    }
}
