// SPDX-FileCopyrightText: 2026 Gazette Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SMTP mailer adapter for the Gazette newsletter service.
//!
//! Delivers the consolidated newsletter as a `multipart/alternative` message
//! with a plain-text rendering derived from the HTML, over a STARTTLS relay.

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info};

use gazette_config::model::EmailConfig;
use gazette_core::traits::adapter::PluginAdapter;
use gazette_core::traits::mailer::MailerAdapter;
use gazette_core::types::{AdapterType, HealthStatus};
use gazette_core::GazetteError;

/// Width used when wrapping the plain-text alternative.
const PLAIN_TEXT_WIDTH: usize = 80;

/// Mailer that relays through an authenticated SMTP server.
pub struct SmtpMailer {
    host: String,
    port: u16,
    username: Option<String>,
    password: Option<String>,
    from: Option<String>,
}

impl SmtpMailer {
    pub fn new(config: &EmailConfig) -> Self {
        Self {
            host: config.smtp_host.clone(),
            port: config.smtp_port,
            username: config.username.clone(),
            password: config.password.clone(),
            from: config.from.clone(),
        }
    }

    fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => Some((user, pass)),
            _ => None,
        }
    }

    /// Sender address: `from` when set, else the SMTP username.
    fn sender(&self) -> Option<&str> {
        self.from
            .as_deref()
            .filter(|f| !f.is_empty())
            .or(self.username.as_deref())
    }

    fn transport(&self, user: &str, pass: &str) -> Result<AsyncSmtpTransport<Tokio1Executor>, GazetteError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)
            .map_err(|e| email_error(format!("invalid SMTP relay {}", self.host), e))?
            .port(self.port)
            .credentials(Credentials::new(user.to_string(), pass.to_string()))
            .build();
        Ok(transport)
    }
}

fn email_error<E>(message: String, source: E) -> GazetteError
where
    E: std::error::Error + Send + Sync + 'static,
{
    GazetteError::Email {
        message,
        source: Some(Box::new(source)),
    }
}

/// Plain-text rendering of an HTML body.
pub fn plain_text(html: &str) -> String {
    html2text::from_read(html.as_bytes(), PLAIN_TEXT_WIDTH).unwrap_or_else(|_| html.to_string())
}

/// Build the outgoing message. All recipients go in a single `To` header.
pub fn build_message(
    from: &str,
    recipients: &[String],
    subject: &str,
    html_body: &str,
) -> Result<Message, GazetteError> {
    let from: Mailbox = from
        .parse()
        .map_err(|e| email_error(format!("invalid sender address {from}"), e))?;
    let mut builder = Message::builder().from(from).subject(subject);
    for recipient in recipients {
        let mailbox: Mailbox = recipient
            .parse()
            .map_err(|e| email_error(format!("invalid recipient address {recipient}"), e))?;
        builder = builder.to(mailbox);
    }
    builder
        .multipart(MultiPart::alternative_plain_html(
            plain_text(html_body),
            html_body.to_string(),
        ))
        .map_err(|e| email_error("failed to build message".to_string(), e))
}

#[async_trait]
impl PluginAdapter for SmtpMailer {
    fn name(&self) -> &str {
        "smtp"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Mailer
    }

    async fn health_check(&self) -> Result<HealthStatus, GazetteError> {
        if self.credentials().is_none() {
            return Ok(HealthStatus::Degraded("email credentials missing".to_string()));
        }
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl MailerAdapter for SmtpMailer {
    async fn send(
        &self,
        recipients: &[String],
        subject: &str,
        html_body: &str,
    ) -> Result<(), GazetteError> {
        let (Some((user, pass)), Some(sender)) = (self.credentials(), self.sender()) else {
            return Err(GazetteError::Email {
                message: "email credentials missing".to_string(),
                source: None,
            });
        };

        let message = build_message(sender, recipients, subject, html_body)?;
        debug!(host = %self.host, port = self.port, recipients = recipients.len(), "connecting to SMTP relay");
        self.transport(user, pass)?
            .send(message)
            .await
            .map_err(|e| email_error(format!("SMTP delivery failed: {e}"), e))?;

        info!(recipients = recipients.len(), subject = %subject, "newsletter email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(username: Option<&str>, password: Option<&str>) -> EmailConfig {
        EmailConfig {
            username: username.map(String::from),
            password: password.map(String::from),
            ..EmailConfig::default()
        }
    }

    #[test]
    fn message_carries_both_alternatives() {
        let message = build_message(
            "desk@example.com",
            &["a@example.com".to_string(), "b@example.com".to_string()],
            "Tech Newsletter - May",
            "<html><body><h1>Highlights</h1><p>Patch Tuesday recap</p></body></html>",
        )
        .unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("Subject: Tech Newsletter - May"));
        assert!(raw.contains("a@example.com"));
        assert!(raw.contains("b@example.com"));
        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("text/plain"));
        assert!(raw.contains("text/html"));
    }

    #[test]
    fn plain_text_strips_markup() {
        let text = plain_text("<p>Patch <b>Tuesday</b></p>");
        assert!(text.contains("Patch"));
        assert!(text.contains("Tuesday"));
        assert!(!text.contains("<p>"));
    }

    #[test]
    fn invalid_recipient_is_rejected() {
        let err = build_message("desk@example.com", &["not an address".to_string()], "s", "<p/>")
            .unwrap_err();
        assert!(err.to_string().contains("not an address"));
    }

    #[tokio::test]
    async fn missing_credentials_fail_before_connecting() {
        let mailer = SmtpMailer::new(&config(Some("desk@example.com"), None));
        let err = mailer
            .send(&["a@example.com".to_string()], "s", "<p>x</p>")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "email credentials missing");
        assert!(matches!(
            mailer.health_check().await.unwrap(),
            HealthStatus::Degraded(_)
        ));
    }

    #[test]
    fn sender_falls_back_to_username() {
        let mailer = SmtpMailer::new(&config(Some("desk@example.com"), Some("pw")));
        assert_eq!(mailer.sender(), Some("desk@example.com"));

        let mut with_from = config(Some("desk@example.com"), Some("pw"));
        with_from.from = Some("Newsletter <news@example.com>".to_string());
        assert_eq!(
            SmtpMailer::new(&with_from).sender(),
            Some("Newsletter <news@example.com>")
        );
    }
}
