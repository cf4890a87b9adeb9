//! JSON wire format
//!
//! ```text
//! {
//!   "id": "...", "time": "yyyy-MM-dd HH:mm:ss.SSS",
//!   "type": "...", "recipient": "...", "subject": "...",
//!   "message": "...",
//!   "attachments": [ { "file": "...", "mime": "...", "data": "<base64>" } ],
//!   "cc": [...], "bcc": [...], "format": "...", "priority": "..."
//! }
//! ```
//!
//! Unset fields are omitted on encode; missing and `null` fields are unset on
//! decode. `time` is written in the local time zone.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::attachment::{Attachment, AttachmentParams};
use crate::notification::{ModelError, Notification, NotificationParams};

/// Format used for `time` on encode
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";
/// Format accepted for `time` on decode (fraction optional)
const TIME_PARSE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Malformed wire-format input.
///
/// This is a caller-input problem, never a delivery outcome.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to encode JSON: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Field-level problems found while converting a decoded document
#[derive(Debug, Error)]
pub enum WireError {
    #[error("missing field `message`")]
    MissingMessage,
    #[error("invalid time `{0}`, expected yyyy-MM-dd HH:mm:ss.SSS")]
    InvalidTime(String),
    #[error("invalid base64 attachment data: {0}")]
    InvalidData(#[from] base64::DecodeError),
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Encode a notification
pub fn to_json(notification: &Notification, pretty: bool) -> Result<String, ParseError> {
    let encoded = if pretty {
        serde_json::to_string_pretty(notification)
    } else {
        serde_json::to_string(notification)
    };
    encoded.map_err(ParseError::Encode)
}

/// Decode a notification
pub fn from_json(json: &str) -> Result<Notification, ParseError> {
    Ok(serde_json::from_str(json)?)
}

pub fn format_time(time: DateTime<Utc>) -> String {
    time.with_timezone(&Local).format(TIME_FORMAT).to_string()
}

pub fn parse_time(value: &str) -> Result<DateTime<Utc>, WireError> {
    let naive = NaiveDateTime::parse_from_str(value.trim(), TIME_PARSE_FORMAT)
        .map_err(|_| WireError::InvalidTime(value.to_string()))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| WireError::InvalidTime(value.to_string()))
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct NotificationJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    time: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    notification_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    recipient: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    subject: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    attachments: Option<Vec<Attachment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cc: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bcc: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    priority: Option<String>,
}

fn non_empty<T>(items: &[T]) -> Option<Vec<T>>
where
    T: Clone,
{
    if items.is_empty() {
        None
    } else {
        Some(items.to_vec())
    }
}

impl From<Notification> for NotificationJson {
    fn from(notification: Notification) -> Self {
        Self {
            id: Some(notification.id().to_string()),
            time: Some(format_time(notification.time())),
            notification_type: notification.notification_type().map(str::to_string),
            recipient: notification.recipient().map(str::to_string),
            subject: notification.subject().map(str::to_string),
            message: Some(notification.message().to_string()),
            attachments: non_empty(notification.attachments()),
            cc: non_empty(notification.cc()),
            bcc: non_empty(notification.bcc()),
            format: notification.format().map(str::to_string),
            priority: notification.priority().map(str::to_string),
        }
    }
}

impl TryFrom<NotificationJson> for Notification {
    type Error = WireError;

    fn try_from(json: NotificationJson) -> Result<Self, Self::Error> {
        let time = json.time.as_deref().map(parse_time).transpose()?;
        let message = json.message.ok_or(WireError::MissingMessage)?;

        let notification = Notification::new(NotificationParams {
            id: json.id,
            time,
            notification_type: json.notification_type,
            recipient: json.recipient,
            subject: json.subject,
            message,
            attachments: json.attachments.unwrap_or_default(),
            cc: json.cc.unwrap_or_default(),
            bcc: json.bcc.unwrap_or_default(),
            format: json.format,
            priority: json.priority,
        })?;
        Ok(notification)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct AttachmentJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<String>,
}

impl From<Attachment> for AttachmentJson {
    fn from(attachment: Attachment) -> Self {
        Self {
            file: attachment.file().map(str::to_string),
            mime: attachment.mime().map(str::to_string),
            data: attachment.data().map(|data| BASE64.encode(data)),
        }
    }
}

impl TryFrom<AttachmentJson> for Attachment {
    type Error = WireError;

    fn try_from(json: AttachmentJson) -> Result<Self, Self::Error> {
        let data = json.data.map(|data| BASE64.decode(data)).transpose()?;
        Ok(Attachment::new(AttachmentParams {
            file: json.file,
            mime: json.mime,
            data,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{SubsecRound, Timelike};

    fn full_notification() -> Notification {
        let time = Utc::now().with_nanosecond(987_654_321).unwrap();
        Notification::new(NotificationParams {
            id: Some("n-1".into()),
            time: Some(time),
            notification_type: Some("email".into()),
            recipient: Some("user@example.com".into()),
            subject: Some("Report".into()),
            message: "<p>See <img src=\"cid:chart.png\"></p>".into(),
            attachments: vec![
                Attachment::from_bytes("chart.png", "image/png", &[0, 159, 146, 150, 255]),
                Attachment::from_file("/var/reports/q1.pdf"),
            ],
            cc: vec!["cc@example.com".into()],
            bcc: vec!["audit@example.com".into()],
            format: Some("html".into()),
            priority: Some("high".into()),
        })
        .unwrap()
    }

    #[test]
    fn test_round_trip_preserves_fields() {
        let original = full_notification();
        let json = to_json(&original, false).unwrap();
        let decoded = from_json(&json).unwrap();

        assert_eq!(decoded, original);
        assert_eq!(decoded.time().timestamp_subsec_nanos(), 987_000_000);
        assert_eq!(decoded.notification_type(), Some("EMAIL"));
        assert_eq!(decoded.priority(), Some("HIGH"));
        assert_eq!(
            decoded.attachments()[0].data(),
            Some(&[0u8, 159, 146, 150, 255][..])
        );
    }

    #[test]
    fn test_minimal_document_omits_unset_fields() {
        let notification = Notification::new(NotificationParams::new("hi")).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&to_json(&notification, true).unwrap()).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object["message"], "hi");
        assert!(object.contains_key("id"));
        assert!(object.contains_key("time"));
        for absent in ["attachments", "cc", "bcc", "type", "subject", "format", "priority", "recipient"] {
            assert!(!object.contains_key(absent), "{} should be omitted", absent);
        }
    }

    #[test]
    fn test_pretty_output() {
        let notification = Notification::new(NotificationParams::new("hi")).unwrap();
        let json = to_json(&notification, true).unwrap();
        assert!(json.contains("\"message\": \"hi\""));
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_decode_fills_defaults() {
        let decoded = from_json(r#"{"message": "hello", "cc": null, "subject": null}"#).unwrap();
        assert!(!decoded.id().is_empty());
        assert!(decoded.cc().is_empty());
        assert!(decoded.subject().is_none());
    }

    #[test]
    fn test_time_format() {
        let time = Local
            .with_ymd_and_hms(2024, 1, 15, 8, 5, 9)
            .unwrap()
            .with_nanosecond(7_000_000)
            .unwrap()
            .with_timezone(&Utc);

        assert_eq!(format_time(time), "2024-01-15 08:05:09.007");
        assert_eq!(parse_time("2024-01-15 08:05:09.007").unwrap(), time);
        assert_eq!(
            parse_time("2024-01-15 08:05:09").unwrap(),
            time.trunc_subsecs(0)
        );
    }

    #[test]
    fn test_malformed_documents() {
        assert!(matches!(from_json("{not json"), Err(ParseError::Json(_))));
        assert!(from_json(r#"{"id": "x"}"#).is_err());
        assert!(from_json(r#"{"message": "m", "time": "yesterday"}"#).is_err());
        assert!(from_json(r#"{"message": "m", "attachments": [{"data": "***"}]}"#).is_err());
        assert!(from_json(r#"{"message": "m", "id": ""}"#).is_err());
    }

    #[test]
    fn test_attachment_wire_format() {
        let attachment = Attachment::from_bytes("a.txt", "text/plain", b"hello");
        let value = serde_json::to_value(&attachment).unwrap();
        assert_eq!(value, serde_json::json!({"file": "a.txt", "mime": "text/plain", "data": "aGVsbG8="}));

        let file_only: Attachment = serde_json::from_value(serde_json::json!({"file": "x.pdf", "mime": null})).unwrap();
        assert_eq!(file_only.file(), Some("x.pdf"));
        assert!(file_only.mime().is_none());
        assert!(file_only.data().is_none());
    }
}
