//! Email delivery for invitation and welcome messages.
//!
//! Supported providers:
//! - `console`: Logs emails to the application log (development)
//! - `sendgrid`: Sends via the SendGrid API

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, error, info};

use domain::services::notification::{
    InvitationEmail, NotificationDispatcher, NotificationResult, WelcomeEmail,
};

use crate::config::EmailConfig;

/// Errors that can occur during email delivery.
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Email service not configured")]
    NotConfigured,

    #[error("Failed to send email: {0}")]
    SendFailed(String),

    #[error("Provider error: {0}")]
    ProviderError(String),
}

/// Rendered email message.
#[derive(Debug, Clone)]
struct EmailMessage {
    to: String,
    to_name: String,
    subject: String,
    body_text: String,
}

/// Transactional email service backed by a configurable provider.
#[derive(Clone)]
pub struct EmailService {
    config: Arc<EmailConfig>,
    client: reqwest::Client,
}

impl EmailService {
    /// Creates a new EmailService with the given configuration.
    ///
    /// Falls back to a default HTTP client if one cannot be built with the
    /// configured timeout.
    pub fn new(config: EmailConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.send_timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            config: Arc::new(config),
            client,
        }
    }

    async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        match self.config.provider.as_str() {
            "console" => self.send_console(message),
            "sendgrid" => self.send_sendgrid(message).await,
            provider => {
                error!(provider = %provider, "Unknown email provider");
                Err(EmailError::NotConfigured)
            }
        }
    }

    fn send_console(&self, message: EmailMessage) -> Result<(), EmailError> {
        info!(
            to = %message.to,
            to_name = %message.to_name,
            subject = %message.subject,
            from = %self.config.sender_email,
            from_name = %self.config.sender_name,
            "Email (console provider)"
        );
        info!(body_text = %message.body_text, "Email body");
        Ok(())
    }

    async fn send_sendgrid(&self, message: EmailMessage) -> Result<(), EmailError> {
        if self.config.sendgrid_api_key.is_empty() {
            return Err(EmailError::NotConfigured);
        }

        let body = serde_json::json!({
            "personalizations": [{
                "to": [{
                    "email": message.to,
                    "name": message.to_name
                }]
            }],
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
            .header(
                "Authorization",
                format!("Bearer {}", self.config.sendgrid_api_key),
            )
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| EmailError::SendFailed(format!("SendGrid request failed: {}", e)))?;

        if response.status().is_success() {
            info!(to = %message.to, subject = %message.subject, "Email sent via SendGrid");
            Ok(())
        } else {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, error = %error_body, "SendGrid API error");
            Err(EmailError::ProviderError(format!(
                "SendGrid returned {}: {}",
                status, error_body
            )))
        }
    }

    fn render_invitation(&self, email: &InvitationEmail) -> EmailMessage {
        let subject = format!("You have been invited to {}", self.config.sender_name);
        let body_text = format!(
            r#"Hi {name},

You have been invited to join {app} as {role}.

Accept the invitation and set your password here:

{url}

The invitation expires in {days} days.

Best regards,
The {app} Team"#,
            name = email.first_name,
            app = self.config.sender_name,
            role = email.role_label,
            url = email.accept_url,
            days = email.expires_in_days
        );

        EmailMessage {
            to: email.to.clone(),
            to_name: email.first_name.clone(),
            subject,
            body_text,
        }
    }

    fn render_welcome(&self, email: &WelcomeEmail) -> EmailMessage {
        let subject = format!("Welcome to {}", self.config.sender_name);
        let body_text = format!(
            r#"Hi {name},

Your account is now active. Sign in here:

{url}

Best regards,
The {app} Team"#,
            name = email.first_name,
            app = self.config.sender_name,
            url = email.portal_url
        );

        EmailMessage {
            to: email.to.clone(),
            to_name: email.first_name.clone(),
            subject,
            body_text,
        }
    }

    async fn deliver(&self, message: EmailMessage) -> NotificationResult {
        if !self.config.enabled {
            debug!(
                to = %message.to,
                subject = %message.subject,
                "Email delivery disabled, skipping send"
            );
            return NotificationResult::Skipped;
        }

        match self.send(message).await {
            Ok(()) => NotificationResult::Sent,
            Err(e) => NotificationResult::Failed(e.to_string()),
        }
    }
}

#[async_trait::async_trait]
impl NotificationDispatcher for EmailService {
    async fn send_invitation(&self, email: InvitationEmail) -> NotificationResult {
        let message = self.render_invitation(&email);
        self.deliver(message).await
    }

    async fn send_welcome(&self, email: WelcomeEmail) -> NotificationResult {
        let message = self.render_welcome(&email);
        self.deliver(message).await
    }
}
