//! Notification dispatcher
//!
//! Sends a notification through every registered channel in registration
//! order and stops at the first failure.

use notify_core::{ConfigError, SendFailure};
use notify_models::Notification;
use tracing::{debug, info, warn};

use crate::channel::{ChannelConfig, ChannelType, NotificationChannel};

/// Sequential fail-fast dispatcher
#[derive(Default)]
pub struct NotificationDispatcher {
    channels: Vec<Box<dyn NotificationChannel>>,
}

impl NotificationDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dispatcher with one channel per configuration entry
    pub fn from_configs(configs: &[ChannelConfig]) -> Result<Self, ConfigError> {
        let mut dispatcher = Self::new();
        for config in configs {
            dispatcher.channels.push(config.build()?);
        }
        Ok(dispatcher)
    }

    /// Register a channel
    pub fn add_channel<C>(&mut self, channel: C)
    where
        C: NotificationChannel + 'static,
    {
        self.channels.push(Box::new(channel));
    }

    /// Register a channel (builder style)
    pub fn with_channel<C>(mut self, channel: C) -> Self
    where
        C: NotificationChannel + 'static,
    {
        self.add_channel(channel);
        self
    }

    pub fn channel_types(&self) -> Vec<ChannelType> {
        self.channels.iter().map(|c| c.channel_type()).collect()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Deliver `notification` through every channel.
    ///
    /// The first failure is returned unchanged and later channels are not
    /// attempted. With no channels this succeeds without doing anything.
    pub async fn send(&self, notification: &Notification) -> Result<(), SendFailure> {
        if self.channels.is_empty() {
            debug!(notification_id = notification.id(), "No channels registered");
            return Ok(());
        }

        for channel in &self.channels {
            let channel_type = channel.channel_type();
            debug!(
                notification_id = notification.id(),
                channel = %channel_type,
                "Dispatching notification"
            );

            if let Err(failure) = channel.attempt_delivery(notification).await {
                warn!(
                    notification_id = notification.id(),
                    channel = %channel_type,
                    kind = %failure.kind(),
                    error = %failure,
                    "Notification dispatch stopped"
                );
                return Err(failure);
            }
        }

        info!(
            notification_id = notification.id(),
            channels = self.channels.len(),
            "Notification dispatched"
        );
        Ok(())
    }
}

impl std::fmt::Debug for NotificationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationDispatcher")
            .field("channels", &self.channel_types())
            .finish()
    }
}
