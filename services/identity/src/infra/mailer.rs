use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::Arc;

use crate::config::SmtpConfig;
use crate::domain::repository::Mailer;
use crate::error::IdentityServiceError;

/// Async SMTP mailer. With an empty host it runs in no-op mode and only logs,
/// which is what local development and tests want.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: Option<Arc<AsyncSmtpTransport<Tokio1Executor>>>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, IdentityServiceError> {
        let from = config
            .from
            .parse::<Mailbox>()
            .map_err(|e| IdentityServiceError::Internal(anyhow::anyhow!("invalid SMTP_FROM: {e}")))?;

        let transport = if config.host.trim().is_empty() {
            tracing::warn!("SMTP host not configured; mailer runs in no-op mode");
            None
        } else {
            let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|e| {
                    IdentityServiceError::Internal(anyhow::anyhow!("smtp transport: {e}"))
                })?
                .port(config.port);
            if let (Some(username), Some(password)) = (&config.username, &config.password) {
                builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
            }
            Some(Arc::new(builder.build()))
        };

        Ok(Self { transport, from })
    }

    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        body: String,
    ) -> Result<(), IdentityServiceError> {
        let Some(transport) = &self.transport else {
            tracing::info!(recipient, subject, "mail skipped (no-op mode)");
            return Ok(());
        };

        let to = recipient
            .parse::<Mailbox>()
            .map_err(|e| IdentityServiceError::Internal(anyhow::anyhow!("invalid recipient: {e}")))?;
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .body(body)
            .map_err(|e| IdentityServiceError::Internal(anyhow::anyhow!("build mail: {e}")))?;

        transport
            .send(message)
            .await
            .map_err(|e| IdentityServiceError::Internal(anyhow::anyhow!("send mail: {e}")))?;
        Ok(())
    }
}

impl Mailer for SmtpMailer {
    async fn send_confirmation(
        &self,
        email: &str,
        name: &str,
        token: &str,
    ) -> Result<(), IdentityServiceError> {
        let body = format!(
            "Hello {name},\n\nConfirm your email with this token:\n\n{token}\n\nIf you did not register, ignore this message.\n"
        );
        self.send(email, "Confirm your email", body).await
    }

    async fn send_welcome(&self, email: &str, name: &str) -> Result<(), IdentityServiceError> {
        let body = format!("Hello {name},\n\nYour email is confirmed. Welcome aboard.\n");
        self.send(email, "Welcome", body).await
    }

    async fn send_password_reset(
        &self,
        email: &str,
        name: &str,
        token: &str,
    ) -> Result<(), IdentityServiceError> {
        let body = format!(
            "Hello {name},\n\nReset your password with this token (valid for one hour):\n\n{token}\n\nIf you did not request this, ignore this message.\n"
        );
        self.send(email, "Password reset", body).await
    }
}
