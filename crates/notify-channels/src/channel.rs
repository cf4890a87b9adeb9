//! Channel contract and channel configuration

use std::fmt;

use async_trait::async_trait;
use notify_core::config::{AppConfig, EmailSettings};
use notify_core::{ConfigError, SendFailure};
use notify_models::Notification;
use serde::{Deserialize, Serialize};

use crate::console::{ConsoleChannel, ConsoleConfig};
use crate::email::{EmailChannel, EmailSenderConfig};

/// Channel types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelType {
    Console,
    Email,
}

impl ChannelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Console => "console",
            Self::Email => "email",
        }
    }
}

impl fmt::Display for ChannelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A delivery channel.
///
/// `attempt_delivery` makes exactly one attempt and has finished with it
/// (connections closed, files released) by the time it returns. Retrying is
/// left to the caller, guided by [`SendFailure::is_retryable`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    fn channel_type(&self) -> ChannelType;

    async fn attempt_delivery(&self, notification: &Notification) -> Result<(), SendFailure>;
}

/// Configuration for one channel
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChannelConfig {
    Console(ConsoleConfig),
    Email(EmailSettings),
}

impl ChannelConfig {
    pub fn channel_type(&self) -> ChannelType {
        match self {
            Self::Console(_) => ChannelType::Console,
            Self::Email(_) => ChannelType::Email,
        }
    }

    /// Validate the configuration and build the channel
    pub fn build(&self) -> Result<Box<dyn NotificationChannel>, ConfigError> {
        let channel: Box<dyn NotificationChannel> = match self {
            Self::Console(config) => Box::new(ConsoleChannel::new(config.clone())),
            Self::Email(settings) => {
                Box::new(EmailChannel::new(EmailSenderConfig::try_from(settings)?))
            }
        };
        Ok(channel)
    }

    /// Channel configurations for everything enabled in `config`, console
    /// first
    pub fn from_app_config(config: &AppConfig) -> Result<Vec<Self>, ConfigError> {
        let mut channels = Vec::new();
        if let Some(console) = &config.console {
            channels.push(Self::Console(ConsoleConfig::try_from(console)?));
        }
        if let Some(email) = &config.email {
            channels.push(Self::Email(email.clone()));
        }
        Ok(channels)
    }
}
