//! # notify-channels
//!
//! Delivery of notifications through pluggable channels.
//!
//! ## Features
//!
//! - [`NotificationChannel`] contract: one delivery attempt, classified failure
//! - Console channel (plain, text or JSON rendering)
//! - Email channel over SMTP with retryable/permanent failure classification
//! - Sequential fail-fast [`NotificationDispatcher`]

pub mod channel;
pub mod console;
pub mod dispatcher;
pub mod email;

pub use channel::{ChannelConfig, ChannelType, NotificationChannel};
pub use console::{ConsoleChannel, ConsoleConfig, ConsoleFormat};
pub use dispatcher::NotificationDispatcher;
pub use email::{
    EmailChannel, EmailSenderConfig, MailServerConfig, MailServerParams, MailServerSecurity,
    MailTransport, SessionSettings, SmtpMailTransport, TransportError,
};
pub use notify_core::{FailureKind, SendFailure};
