//! Contact submission pipeline: validate, check configuration, compose, dispatch

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::config::{MailConfig, SmtpConfig};
use crate::error::{AppError, Result};
use crate::mail::{ContactEmail, DeliveryId, MailTransport};
use crate::models::ContactSubmission;

#[derive(Clone)]
pub struct ContactService {
    smtp: SmtpConfig,
    mail: MailConfig,
    transport: Arc<dyn MailTransport>,
}

impl ContactService {
    pub fn new(smtp: SmtpConfig, mail: MailConfig, transport: Arc<dyn MailTransport>) -> Self {
        Self {
            smtp,
            mail,
            transport,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.smtp.has_credentials()
    }

    /// Relays one submission and waits for the transport outcome.
    pub async fn submit(&self, submission: ContactSubmission) -> Result<DeliveryId> {
        let submission = submission.validate()?;

        debug!(
            host = %self.smtp.host,
            port = self.smtp.port,
            user = ?self.smtp.user,
            "Checking SMTP configuration"
        );
        if !self.is_configured() {
            warn!("Refusing submission: SMTP credentials missing");
            return Err(AppError::NotConfigured);
        }

        let email = ContactEmail::compose(&submission, &self.smtp, &self.mail);

        info!(reply_to = %email.reply_to, "Sending contact email");
        match self.transport.send(&email).await {
            Ok(id) => {
                info!(message_id = %id, "Email sent successfully");
                Ok(id)
            }
            Err(e) => {
                error!(error = %e, "Failed to send contact email");
                Err(AppError::Delivery(e))
            }
        }
    }
}
