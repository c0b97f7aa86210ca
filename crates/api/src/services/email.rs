//! Email service for the welcome mail sent when a registration is
//! approved.
//!
//! Providers:
//! - `console`: logs emails instead of sending (development)
//! - `sendgrid`: sends via the SendGrid API
//!
//! Delivery is always fire-and-forget relative to the approval flow; a
//! slow provider must never block the transaction that created the
//! member.

use crate::config::EmailConfig;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};

/// Errors that can occur during email operations.
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Email service not configured")]
    NotConfigured,

    #[error("Failed to send email: {0}")]
    SendFailed(String),

    #[error("Provider error: {0}")]
    ProviderError(String),
}

/// Email message to be sent.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub to_name: Option<String>,
    pub subject: String,
    pub body_text: String,
}

/// Service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    config: Arc<EmailConfig>,
    client: reqwest::Client,
}

impl EmailService {
    /// Creates a new EmailService with the given configuration.
    pub fn new(config: EmailConfig) -> Self {
        Self {
            config: Arc::new(config),
            client: reqwest::Client::new(),
        }
    }

    /// Check if email sending is enabled.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Send an email message via the configured provider.
    pub async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        if !self.config.enabled {
            debug!(
                to = %message.to,
                subject = %message.subject,
                "Email service disabled, skipping send"
            );
            return Ok(());
        }

        match self.config.provider.as_str() {
            "console" => self.send_console(message),
            "sendgrid" => self.send_sendgrid(message).await,
            provider => {
                error!(provider = %provider, "Unknown email provider");
                Err(EmailError::NotConfigured)
            }
        }
    }

    /// Welcome email for a newly approved member. The fellowship number
    /// doubles as the initial password, so it is spelled out.
    pub async fn send_welcome_email(
        &self,
        to_email: &str,
        to_name: &str,
        fellowship_number: &str,
    ) -> Result<(), EmailError> {
        let body_text = format!(
            r#"Hi {name},

Welcome to the fellowship! Your registration has been approved.

Your fellowship number is: {number}

Use it to check in at events and to sign in{portal}. Your initial
password is your fellowship number - please change it after your first
sign-in.

See you at the next gathering!
"#,
            name = to_name,
            number = fellowship_number,
            portal = if self.config.base_url.is_empty() {
                String::new()
            } else {
                format!(" at {}", self.config.base_url)
            },
        );

        self.send(EmailMessage {
            to: to_email.to_string(),
            to_name: Some(to_name.to_string()),
            subject: "Welcome to the fellowship".to_string(),
            body_text,
        })
        .await
    }

    /// Console provider - logs instead of sending.
    fn send_console(&self, message: EmailMessage) -> Result<(), EmailError> {
        info!(
            to = %message.to,
            to_name = ?message.to_name,
            subject = %message.subject,
            from = %self.config.sender_email,
            "Email (console provider)"
        );
        info!(body_text = %message.body_text, "Email body");
        Ok(())
    }

    /// SendGrid provider - sends via the SendGrid API.
    async fn send_sendgrid(&self, message: EmailMessage) -> Result<(), EmailError> {
        if self.config.sendgrid_api_key.is_empty() {
            return Err(EmailError::NotConfigured);
        }

        let mut to = serde_json::json!({ "email": message.to });
        if let Some(name) = &message.to_name {
            to["name"] = serde_json::json!(name);
        }

        let body = serde_json::json!({
            "personalizations": [{ "to": [to] }],
            "from": {
                "email": self.config.sender_email,
                "name": self.config.sender_name
            },
            "subject": message.subject,
            "content": [{
                "type": "text/plain",
                "value": message.body_text
            }]
        });

        let response = self
            .client
            .post("https://api.sendgrid.com/v3/mail/send")
            .bearer_auth(&self.config.sendgrid_api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| EmailError::SendFailed(e.to_string()))?;

        if response.status().is_success() {
            info!(to = %message.to, "Email sent via SendGrid");
            Ok(())
        } else {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            error!(status = %status, detail = %detail, "SendGrid rejected email");
            Err(EmailError::ProviderError(format!(
                "SendGrid returned {}",
                status
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disabled_service() -> EmailService {
        EmailService::new(EmailConfig::default())
    }

    #[tokio::test]
    async fn test_disabled_service_skips_send() {
        let service = disabled_service();
        assert!(!service.is_enabled());
        let result = service
            .send_welcome_email("new@example.org", "New Member", "FSM001")
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_provider_rejected() {
        let config = EmailConfig {
            enabled: true,
            provider: "carrier-pigeon".into(),
            ..EmailConfig::default()
        };
        let service = EmailService::new(config);
        let result = service
            .send(EmailMessage {
                to: "x@example.org".into(),
                to_name: None,
                subject: "s".into(),
                body_text: "b".into(),
            })
            .await;
        assert!(matches!(result, Err(EmailError::NotConfigured)));
    }

    #[tokio::test]
    async fn test_console_provider_succeeds() {
        let config = EmailConfig {
            enabled: true,
            provider: "console".into(),
            ..EmailConfig::default()
        };
        let service = EmailService::new(config);
        let result = service
            .send_welcome_email("new@example.org", "New Member", "FSM001")
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_sendgrid_without_key_not_configured() {
        let config = EmailConfig {
            enabled: true,
            provider: "sendgrid".into(),
            ..EmailConfig::default()
        };
        let service = EmailService::new(config);
        let result = service
            .send(EmailMessage {
                to: "x@example.org".into(),
                to_name: None,
                subject: "s".into(),
                body_text: "b".into(),
            })
            .await;
        assert!(matches!(result, Err(EmailError::NotConfigured)));
    }
}
