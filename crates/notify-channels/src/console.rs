//! Console channel
//!
//! Prints notifications to standard output. Useful during development and
//! as a fallback sink; it never reports a failure.

use std::fmt::Write as _;
use std::str::FromStr;

use async_trait::async_trait;
use notify_core::config::ConsoleSettings;
use notify_core::{ConfigError, SendFailure};
use notify_models::json::{format_time, to_json};
use notify_models::Notification;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::channel::{ChannelType, NotificationChannel};

/// How the console channel renders a notification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConsoleFormat {
    /// The notification's debug representation
    #[default]
    #[serde(alias = "none")]
    None,
    /// One labelled line per field
    #[serde(alias = "text")]
    Text,
    /// The JSON wire format
    #[serde(alias = "json")]
    Json,
}

impl FromStr for ConsoleFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_uppercase().as_str() {
            "" | "NONE" => Ok(Self::None),
            "TEXT" => Ok(Self::Text),
            "JSON" => Ok(Self::Json),
            _ => Err(ConfigError::invalid(
                "format",
                format!("Unknown console format: {}", value),
            )),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default)]
    pub format: ConsoleFormat,
    /// Indent JSON output
    #[serde(default)]
    pub pretty: bool,
}

impl ConsoleConfig {
    pub fn new(format: ConsoleFormat) -> Self {
        Self {
            format,
            pretty: false,
        }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl TryFrom<&ConsoleSettings> for ConsoleConfig {
    type Error = ConfigError;

    fn try_from(settings: &ConsoleSettings) -> Result<Self, Self::Error> {
        Ok(Self {
            format: settings.format.parse()?,
            pretty: settings.pretty,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConsoleChannel {
    config: ConsoleConfig,
}

impl ConsoleChannel {
    pub fn new(config: ConsoleConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    /// Render a notification the way it will be printed
    pub fn render(&self, notification: &Notification) -> String {
        match self.config.format {
            ConsoleFormat::None => format!("{:?}", notification),
            ConsoleFormat::Text => render_text(notification),
            ConsoleFormat::Json => match to_json(notification, self.config.pretty) {
                Ok(json) => json,
                Err(e) => {
                    warn!(
                        notification_id = notification.id(),
                        error = %e,
                        "Failed to encode notification, printing debug form"
                    );
                    format!("{:?}", notification)
                }
            },
        }
    }
}

fn render_text(notification: &Notification) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Notification {}", notification.id());
    let _ = writeln!(out, "  Time:      {}", format_time(notification.time()));

    let optional = [
        ("Type", notification.notification_type()),
        ("Recipient", notification.recipient()),
        ("Subject", notification.subject()),
        ("Format", notification.format()),
        ("Priority", notification.priority()),
    ];
    for (label, value) in optional {
        if let Some(value) = value {
            let _ = writeln!(out, "  {:<10} {}", format!("{}:", label), value);
        }
    }
    if !notification.cc().is_empty() {
        let _ = writeln!(out, "  Cc:        {}", notification.cc().join(", "));
    }
    if !notification.bcc().is_empty() {
        let _ = writeln!(out, "  Bcc:       {}", notification.bcc().join(", "));
    }
    for attachment in notification.attachments() {
        let _ = writeln!(
            out,
            "  Attachment: {} ({}, {} bytes)",
            attachment.file().unwrap_or("<unnamed>"),
            attachment.mime().unwrap_or("unknown type"),
            attachment.data().map_or(0, <[u8]>::len)
        );
    }
    out.push_str(notification.message());
    out
}

#[async_trait]
impl NotificationChannel for ConsoleChannel {
    fn channel_type(&self) -> ChannelType {
        ChannelType::Console
    }

    async fn attempt_delivery(&self, notification: &Notification) -> Result<(), SendFailure> {
        println!("{}", self.render(notification));
        debug!(notification_id = notification.id(), "Notification printed to console");
        Ok(())
    }
}
