// Email Sender - delivers rendered messages to the HTTP email API

use super::types::{EmailError, EmailMessage, EmailPayload};
use crate::app_config::EmailConfig;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument};

#[derive(Clone)]
pub struct EmailSender {
    client: Arc<Client>,
    api_key: String,
    api_url: String,
}

impl EmailSender {
    pub fn new(api_url: String, api_key: String, timeout: Duration) -> Result<Self, EmailError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EmailError::ConfigError(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client: Arc::new(client),
            api_key,
            api_url,
        })
    }

    /// Build a sender from the email section of the app config
    ///
    /// Returns `Ok(None)` when no API key is configured.
    pub fn from_config(config: &EmailConfig) -> Result<Option<Self>, EmailError> {
        let api_key = match config.api_key.clone() {
            Some(key) if config.is_enabled() => key,
            _ => return Ok(None),
        };

        Self::new(
            config.api_url.clone(),
            api_key,
            Duration::from_secs(config.timeout_secs),
        )
        .map(Some)
    }

    /// One delivery attempt; failures go back to the caller untouched
    #[instrument(skip(self, message), fields(to = ?message.to, subject = %message.subject))]
    pub async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        let payload: EmailPayload = message.into();

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await;

        match response {
            Ok(res) if res.status().is_success() => {
                info!("Email sent successfully");
                Ok(())
            },
            Ok(res) => {
                let status = res.status();
                let error_text = res
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());

                error!(%status, error = %error_text, "Email API rejected message");

                if status == StatusCode::TOO_MANY_REQUESTS {
                    Err(EmailError::RateLimitExceeded)
                } else if status.is_server_error() {
                    Err(EmailError::ServiceUnavailable)
                } else {
                    Err(EmailError::SendError(format!(
                        "Email send failed with status {}: {}",
                        status, error_text
                    )))
                }
            },
            Err(e) => {
                error!(error = ?e, "Network error while sending email");
                Err(EmailError::SendError(format!("Network error: {}", e)))
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_without_key() {
        let config = EmailConfig {
            api_key: None,
            api_url: "https://api.resend.com/emails".to_string(),
            from_email: "noreply@moyak.com".to_string(),
            from_name: "MOYAK".to_string(),
            timeout_secs: 10,
        };
        assert!(EmailSender::from_config(&config).unwrap().is_none());
    }
}
