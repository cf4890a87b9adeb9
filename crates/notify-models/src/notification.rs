//! Notification Model

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::attachment::Attachment;
use crate::json::NotificationJson;

/// Errors raised while constructing a notification
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("Notification id must not be blank")]
    EmptyId,
}

/// Construction parameters for a [`Notification`].
///
/// Everything except `message` is optional; unset `id` and `time` are filled
/// in by [`Notification::new`].
#[derive(Debug, Clone, Default)]
pub struct NotificationParams {
    pub id: Option<String>,
    pub time: Option<DateTime<Utc>>,
    /// Classification tag such as "EMAIL", "SMS" or "VOICE"
    pub notification_type: Option<String>,
    /// Channel-specific destination: email address, phone number, user handle
    pub recipient: Option<String>,
    pub subject: Option<String>,
    pub message: String,
    pub attachments: Vec<Attachment>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub format: Option<String>,
    pub priority: Option<String>,
}

impl NotificationParams {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }
}

/// An immutable notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "NotificationJson", try_from = "NotificationJson")]
pub struct Notification {
    id: String,
    time: DateTime<Utc>,
    notification_type: Option<String>,
    recipient: Option<String>,
    subject: Option<String>,
    message: String,
    attachments: Vec<Attachment>,
    cc: Vec<String>,
    bcc: Vec<String>,
    format: Option<String>,
    priority: Option<String>,
}

impl Notification {
    /// Build a notification, normalizing tags and truncating the timestamp to
    /// milliseconds
    pub fn new(params: NotificationParams) -> Result<Self, ModelError> {
        let id = match params.id {
            Some(id) if id.trim().is_empty() => return Err(ModelError::EmptyId),
            Some(id) => id,
            None => uuid::Uuid::new_v4().to_string(),
        };

        Ok(Self {
            id,
            time: params.time.unwrap_or_else(Utc::now).trunc_subsecs(3),
            notification_type: normalize_tag(params.notification_type),
            recipient: params.recipient,
            subject: params.subject,
            message: params.message,
            attachments: params.attachments,
            cc: params.cc,
            bcc: params.bcc,
            format: normalize_tag(params.format),
            priority: normalize_tag(params.priority),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    pub fn notification_type(&self) -> Option<&str> {
        self.notification_type.as_deref()
    }

    pub fn recipient(&self) -> Option<&str> {
        self.recipient.as_deref()
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Attachments in order; empty when none were given
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    pub fn cc(&self) -> &[String] {
        &self.cc
    }

    pub fn bcc(&self) -> &[String] {
        &self.bcc
    }

    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    pub fn priority(&self) -> Option<&str> {
        self.priority.as_deref()
    }

    /// Copy the values back into construction parameters
    pub fn to_params(&self) -> NotificationParams {
        NotificationParams {
            id: Some(self.id.clone()),
            time: Some(self.time),
            notification_type: self.notification_type.clone(),
            recipient: self.recipient.clone(),
            subject: self.subject.clone(),
            message: self.message.clone(),
            attachments: self.attachments.clone(),
            cc: self.cc.clone(),
            bcc: self.bcc.clone(),
            format: self.format.clone(),
            priority: self.priority.clone(),
        }
    }
}

/// Trim and uppercase; blank becomes `None`
fn normalize_tag(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_uppercase())
        .filter(|v| !v.is_empty())
}
