//! Email channel
//!
//! Delivery runs as a fixed pipeline: validate the notification, derive
//! the SMTP session, assemble the message, hand it to the transport, and
//! classify whatever went wrong.

pub mod classify;
pub mod config;
pub mod error;
pub mod html;
pub mod message;
pub mod session;
pub mod transport;

use async_trait::async_trait;
use notify_core::SendFailure;
use notify_models::Notification;
use tracing::{debug, info, warn};

use crate::channel::{ChannelType, NotificationChannel};

pub use classify::classify;
pub use config::{EmailSenderConfig, MailServerConfig, MailServerParams, MailServerSecurity};
pub use error::{EmailError, TransportError};
pub use session::SessionSettings;
pub use transport::{MailTransport, SmtpMailTransport};

/// Delivers notifications as MIME email over SMTP
pub struct EmailChannel {
    config: EmailSenderConfig,
    transport: Box<dyn MailTransport>,
}

impl EmailChannel {
    /// Email channel using the SMTP transport
    pub fn new(config: EmailSenderConfig) -> Self {
        Self::with_transport(config, SmtpMailTransport::new())
    }

    /// Email channel using a custom transport
    pub fn with_transport<T>(config: EmailSenderConfig, transport: T) -> Self
    where
        T: MailTransport + 'static,
    {
        Self {
            config,
            transport: Box::new(transport),
        }
    }

    pub fn config(&self) -> &EmailSenderConfig {
        &self.config
    }

    /// Check that a notification can be sent as email at all
    pub fn validate(notification: &Notification) -> Result<(), SendFailure> {
        let recipient = notification
            .recipient()
            .filter(|r| !r.trim().is_empty())
            .ok_or_else(|| SendFailure::permanent("Recipient email address is required"))?;

        if notification.message().trim().is_empty() {
            return Err(SendFailure::permanent("Message content is required"));
        }

        check_address(recipient, "Invalid recipient email address")?;
        for cc in notification.cc() {
            check_address(cc, "Invalid CC email address")?;
        }
        for bcc in notification.bcc() {
            check_address(bcc, "Invalid BCC email address")?;
        }

        Ok(())
    }
}

fn check_address(address: &str, context: &str) -> Result<(), SendFailure> {
    message::parse_mailbox(address)
        .map(|_| ())
        .map_err(|err| SendFailure::permanent(format!("{}: {}", context, address)).with_cause(err))
}

impl std::fmt::Debug for EmailChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailChannel")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl NotificationChannel for EmailChannel {
    fn channel_type(&self) -> ChannelType {
        ChannelType::Email
    }

    async fn attempt_delivery(&self, notification: &Notification) -> Result<(), SendFailure> {
        Self::validate(notification)?;

        let session = SessionSettings::from_config(self.config.server());
        let message = message::build_message(&self.config, notification)
            .await
            .map_err(classify)?;

        debug!(
            notification_id = notification.id(),
            host = %session.host,
            port = session.port,
            attachments = notification.attachments().len(),
            "Sending email"
        );

        if let Err(err) = self.transport.send(&session, message).await {
            let failure = classify(err.into());
            warn!(
                notification_id = notification.id(),
                retryable = failure.is_retryable(),
                error = %failure,
                "Email delivery failed"
            );
            return Err(failure);
        }

        info!(
            notification_id = notification.id(),
            recipient = notification.recipient().unwrap_or_default(),
            "Email sent"
        );
        Ok(())
    }
}
