//! services/api/src/adapters/mailer.rs
//!
//! Adapters for the `NotificationService` port: an SMTP sender built on `lettre`,
//! and a fallback that only logs when no relay is configured.

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use storefront_core::ports::{NotificationService, PortError, PortResult};
use tracing::{info, warn};

use crate::config::MailConfig;

//=========================================================================================
// SMTP
//=========================================================================================

/// Sends email through an SMTP relay.
pub struct SmtpNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    /// Builds the transport once at startup. Returns `None` if no relay is configured.
    pub fn from_config(config: &MailConfig) -> PortResult<Option<Self>> {
        let (Some(host), Some(from_address)) = (&config.smtp_host, &config.from_address) else {
            return Ok(None);
        };

        let from: Mailbox = format!("{} <{}>", config.from_name, from_address)
            .parse()
            .map_err(|e| PortError::Unexpected(format!("Invalid sender address: {}", e)))?;

        let builder = if config.smtp_tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)
                .map_err(|e| PortError::Unexpected(e.to_string()))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
        }
        .port(config.smtp_port);

        let builder = match (&config.smtp_username, &config.smtp_password) {
            (Some(username), Some(password)) => {
                builder.credentials(Credentials::new(username.clone(), password.clone()))
            }
            _ => builder,
        };

        Ok(Some(Self {
            mailer: builder.build(),
            from,
        }))
    }
}

#[async_trait]
impl NotificationService for SmtpNotifier {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> PortResult<()> {
        let to_mailbox: Mailbox = to
            .parse()
            .map_err(|e| PortError::Unexpected(format!("Invalid recipient '{}': {}", to, e)))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to_mailbox)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        self.mailer
            .send(email)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

//=========================================================================================
// Log-only fallback
//=========================================================================================

/// Used when SMTP is not configured. Nothing leaves the process.
pub struct LogNotifier;

#[async_trait]
impl NotificationService for LogNotifier {
    async fn send(&self, to: &str, subject: &str, _html_body: &str) -> PortResult<()> {
        warn!(to = %to, subject = %subject, "Email not configured, skipping send");
        Ok(())
    }
}
