use crate::config::EmailConfig;
use crate::error::{AppError, AppResult};
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

/// Transactional mail over an HTTP API (SendGrid v3 request format).
#[derive(Clone)]
pub struct MailService {
    client: Client,
    config: EmailConfig,
}

impl MailService {
    pub fn new(config: EmailConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn is_enabled(&self) -> bool {
        !self.config.api_key.is_empty()
    }

    pub async fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        if !self.is_enabled() {
            log::debug!("Email delivery disabled, dropping \"{subject}\" to {to}");
            return Ok(());
        }

        let payload = json!({
            "personalizations": [{ "to": [{ "email": to }] }],
            "from": { "email": self.config.from_email },
            "subject": subject,
            "content": [{ "type": "text/plain", "value": body }],
        });

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await?;

        if response.status().is_success() {
            log::info!("Email \"{subject}\" sent to {to}");
            Ok(())
        } else {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(AppError::ExternalApiError(format!(
                "Email sending failed ({status}): {error_text}"
            )))
        }
    }
}
