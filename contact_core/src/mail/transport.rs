use std::time::Duration;

use async_trait::async_trait;
use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use super::message::ContactEmail;
use crate::config::SmtpConfig;

/// Identifier the transport assigned to an accepted message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeliveryId(pub String);

impl DeliveryId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<String> for DeliveryId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for DeliveryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Failure raised by a mail transport. Displays as the bare description.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("{0}")]
    Address(String),

    #[error("{0}")]
    Message(String),

    #[error("{0}")]
    Tls(String),

    #[error("{0}")]
    Smtp(String),
}

/// Capability to hand a composed email to a mail service and wait for the outcome.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, email: &ContactEmail) -> Result<DeliveryId, TransportError>;
}

/// SMTP transport over implicit TLS.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, TransportError> {
        let tls = TlsParameters::new(config.host.clone())
            .map_err(|e| TransportError::Tls(e.to_string()))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
            .port(config.port)
            .tls(Tls::Wrapper(tls))
            .timeout(Some(Duration::from_secs(config.timeout)));

        if let (Some(user), Some(password)) = (&config.user, &config.password) {
            builder = builder.credentials(Credentials::new(user.clone(), password.clone()));
        }

        info!(
            host = %config.host,
            port = config.port,
            user = ?config.user,
            "SMTP transport configured"
        );

        Ok(Self {
            transport: builder.build(),
        })
    }

    fn build_message(email: &ContactEmail, message_id: &str) -> Result<Message, TransportError> {
        let from: Mailbox = email
            .from_header()
            .parse()
            .map_err(|e| TransportError::Address(format!("Invalid sender address: {}", e)))?;
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|e| TransportError::Address(format!("Invalid recipient address: {}", e)))?;
        let reply_to: Mailbox = email
            .reply_to
            .parse()
            .map_err(|e| TransportError::Address(format!("Invalid reply-to address: {}", e)))?;

        Message::builder()
            .from(from)
            .to(to)
            .reply_to(reply_to)
            .subject(email.subject.clone())
            .message_id(Some(message_id.to_string()))
            .multipart(MultiPart::alternative_plain_html(
                email.text_body.clone(),
                email.html_body.clone(),
            ))
            .map_err(|e| TransportError::Message(e.to_string()))
    }
}

/// Generates `<uuid@domain>` using the domain of the sender address.
pub fn generate_message_id(from_address: &str) -> String {
    let domain = from_address
        .rsplit_once('@')
        .map(|(_, domain)| domain)
        .filter(|domain| !domain.is_empty())
        .unwrap_or("localhost");
    format!("<{}@{}>", Uuid::new_v4(), domain)
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, email: &ContactEmail) -> Result<DeliveryId, TransportError> {
        let message_id = generate_message_id(&email.from_address);
        let message = Self::build_message(email, &message_id)?;

        debug!(message_id = %message_id, "Sending email over SMTP");
        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| TransportError::Smtp(e.to_string()))?;

        debug!(code = %response.code(), "SMTP server accepted message");
        Ok(DeliveryId(message_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(reply_to: &str) -> ContactEmail {
        ContactEmail {
            from_name: "SKYKIN Contact Form".to_string(),
            from_address: "noreply@skykin.tech".to_string(),
            to: "hello@skykin.tech".to_string(),
            reply_to: reply_to.to_string(),
            subject: "New Contact Form Submission from Ada".to_string(),
            text_body: "Hello".to_string(),
            html_body: "<p>Hello</p>".to_string(),
        }
    }

    #[test]
    fn test_message_id_uses_sender_domain() {
        let id = generate_message_id("noreply@skykin.tech");
        assert!(id.starts_with('<'));
        assert!(id.ends_with("@skykin.tech>"));
        assert_ne!(id, generate_message_id("noreply@skykin.tech"));
    }

    #[test]
    fn test_message_id_falls_back_to_localhost() {
        assert!(generate_message_id("not-an-address").ends_with("@localhost>"));
    }

    #[test]
    fn test_build_message_sets_headers() {
        let message = SmtpMailer::build_message(&email("ada@example.com"), "<id@skykin.tech>")
            .unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("Reply-To: ada@example.com"));
        assert!(raw.contains("To: hello@skykin.tech"));
        assert!(raw.contains("Message-ID: <id@skykin.tech>"));
        assert!(raw.contains("Subject: New Contact Form Submission from Ada"));
        assert!(raw.contains("multipart/alternative"));
    }

    #[test]
    fn test_build_message_rejects_unparseable_reply_to() {
        let err = SmtpMailer::build_message(&email("not an address"), "<id@skykin.tech>")
            .unwrap_err();
        assert!(matches!(err, TransportError::Address(_)));
        assert!(err.to_string().starts_with("Invalid reply-to address"));
    }
}
