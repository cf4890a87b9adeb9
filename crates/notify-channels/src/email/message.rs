//! MIME message assembly
//!
//! Layout of every message:
//!
//! ```text
//! multipart/related
//! ├── multipart/alternative
//! │   ├── text/plain  (markup stripped)
//! │   └── text/html   (message wrapped in a UTF-8 envelope)
//! └── one part per usable attachment, each with a Content-ID
//! ```

use lettre::message::header::{ContentDisposition, ContentId, ContentType};
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::{Address, Message};
use notify_models::{Attachment, Notification};
use tracing::debug;

use super::config::EmailSenderConfig;
use super::error::EmailError;
use super::html::{make_html, make_text};

/// MIME type used when an attachment does not declare one
pub const DEFAULT_MIME: &str = "application/octet-stream";

/// Parse a single address, ignoring surrounding whitespace
pub fn parse_mailbox(value: &str) -> Result<Mailbox, EmailError> {
    value
        .trim()
        .parse::<Mailbox>()
        .map_err(|source| EmailError::address(value, source))
}

fn sender(config: &EmailSenderConfig) -> Result<Mailbox, EmailError> {
    let address = config
        .from_mail()
        .trim()
        .parse::<Address>()
        .map_err(|source| EmailError::address(config.from_mail(), source))?;
    let name = config
        .from_name()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string);
    Ok(Mailbox::new(name, address))
}

/// Assemble the message for `notification`
pub async fn build_message(
    config: &EmailSenderConfig,
    notification: &Notification,
) -> Result<Message, EmailError> {
    let mut builder = Message::builder().from(sender(config)?).date_now();

    if let Some(reply_to) = config.reply_to().filter(|r| !r.trim().is_empty()) {
        builder = builder.reply_to(parse_mailbox(reply_to)?);
    }
    if let Some(recipient) = notification.recipient().filter(|r| !r.trim().is_empty()) {
        builder = builder.to(parse_mailbox(recipient)?);
    }
    for cc in notification.cc() {
        builder = builder.cc(parse_mailbox(cc)?);
    }
    for bcc in notification.bcc() {
        builder = builder.bcc(parse_mailbox(bcc)?);
    }
    if let Some(subject) = notification.subject() {
        builder = builder.subject(subject);
    }

    let body = build_body(notification).await?;
    Ok(builder.multipart(body)?)
}

async fn build_body(notification: &Notification) -> Result<MultiPart, EmailError> {
    let message = notification.message();
    let mut body = MultiPart::related().multipart(MultiPart::alternative_plain_html(
        make_text(message),
        make_html(message),
    ));

    for attachment in notification.attachments() {
        match attachment_part(attachment).await? {
            Some(part) => body = body.singlepart(part),
            None => debug!(
                notification_id = notification.id(),
                "Skipping attachment without data or file"
            ),
        }
    }

    Ok(body)
}

/// Body part for one attachment; `None` when it has neither data nor file
async fn attachment_part(attachment: &Attachment) -> Result<Option<SinglePart>, EmailError> {
    let content_id = ContentId::from(format!("<{}>", attachment.content_id()));

    if let Some(data) = attachment.data() {
        let mime = attachment
            .mime()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(DEFAULT_MIME);
        let disposition = match attachment.file().filter(|_| attachment.has_file()) {
            Some(file) => ContentDisposition::attachment(file),
            None => ContentDisposition::inline(),
        };

        let part = SinglePart::builder()
            .header(content_type(mime)?)
            .header(disposition)
            .header(content_id)
            .body(data.to_vec());
        return Ok(Some(part));
    }

    if let Some(path) = attachment.file().filter(|_| attachment.has_file()) {
        let data = tokio::fs::read(path)
            .await
            .map_err(|source| EmailError::AttachmentFile {
                path: path.to_string(),
                source,
            })?;
        let file_name = attachment.file_name().unwrap_or_else(|| path.to_string());
        let mime = mime_guess::from_path(path).first_or_octet_stream();

        let part = SinglePart::builder()
            .header(content_type(mime.essence_str())?)
            .header(ContentDisposition::attachment(&file_name))
            .header(content_id)
            .body(data);
        return Ok(Some(part));
    }

    Ok(None)
}

fn content_type(mime: &str) -> Result<ContentType, EmailError> {
    ContentType::parse(mime).map_err(|e| EmailError::InvalidMime {
        mime: mime.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::email::config::{MailServerConfig, MailServerParams};
    use notify_models::{AttachmentParams, NotificationParams};
    use std::io::Write;

    fn config() -> EmailSenderConfig {
        let server = MailServerConfig::new(MailServerParams {
            host: "smtp.example.com".into(),
            ..Default::default()
        })
        .unwrap();
        EmailSenderConfig::new(server, "noreply@example.com")
            .with_from_name("Notifier")
            .with_reply_to("support@example.com")
    }

    fn notification(attachments: Vec<Attachment>) -> Notification {
        Notification::new(NotificationParams {
            recipient: Some("user@example.com".into()),
            subject: Some("Quarterly report".into()),
            cc: vec!["cc1@example.com".into(), "cc2@example.com".into()],
            bcc: vec!["audit@example.com".into()],
            attachments,
            ..NotificationParams::new("<p>See <img src=\"cid:chart.png\"></p>")
        })
        .unwrap()
    }

    fn formatted(message: &Message) -> String {
        String::from_utf8_lossy(&message.formatted()).into_owned()
    }

    #[tokio::test]
    async fn test_headers_and_envelope() {
        let message = build_message(&config(), &notification(vec![])).await.unwrap();
        let raw = formatted(&message);

        assert!(raw.contains("Notifier"), "{}", raw);
        assert!(raw.contains("<noreply@example.com>"), "{}", raw);
        assert!(raw.contains("Reply-To: support@example.com"), "{}", raw);
        assert!(raw.contains("To: user@example.com"), "{}", raw);
        assert!(raw.contains("cc1@example.com"), "{}", raw);
        assert!(raw.contains("cc2@example.com"), "{}", raw);
        assert!(raw.contains("Subject: Quarterly report"), "{}", raw);
        assert!(raw.contains("Date: "), "{}", raw);
        assert!(!raw.contains("audit@example.com"), "Bcc must not appear in headers");

        let recipients: Vec<String> = message
            .envelope()
            .to()
            .iter()
            .map(|address| address.to_string())
            .collect();
        assert_eq!(recipients.len(), 4);
        assert!(recipients.contains(&"audit@example.com".to_string()));
    }

    #[tokio::test]
    async fn test_body_structure() {
        let message = build_message(&config(), &notification(vec![])).await.unwrap();
        let raw = formatted(&message);

        assert!(raw.contains("multipart/related"));
        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("text/plain"));
        assert!(raw.contains("text/html"));
        assert!(raw.contains("See"));
        assert!(raw.contains("charset=utf-8"));
    }

    #[tokio::test]
    async fn test_data_attachment_part() {
        let attachments = vec![
            Attachment::from_bytes("chart.png", "image/png", &[137, 80, 78, 71]),
            Attachment::new(AttachmentParams {
                file: None,
                mime: None,
                data: Some(b"raw".to_vec()),
            }),
        ];
        let message = build_message(&config(), &notification(attachments))
            .await
            .unwrap();
        let raw = formatted(&message);

        assert!(raw.contains("Content-ID: <chart.png>"), "{}", raw);
        assert!(raw.contains("image/png"));
        assert!(raw.contains("Content-Disposition: attachment; filename=\"chart.png\""), "{}", raw);
        assert!(raw.contains("application/octet-stream"));
        assert!(raw.contains("Content-Disposition: inline"), "{}", raw);
    }

    #[tokio::test]
    async fn test_file_attachment_part() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        file.write_all(b"attached text").unwrap();
        let path = file.path().to_string_lossy().into_owned();
        let name = file
            .path()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .into_owned();

        let message = build_message(&config(), &notification(vec![Attachment::from_file(&path)]))
            .await
            .unwrap();
        let raw = formatted(&message);

        assert!(raw.contains("text/plain"));
        assert!(raw.contains(&format!("filename=\"{}\"", name)), "{}", raw);
    }

    #[tokio::test]
    async fn test_missing_file_attachment() {
        let err = build_message(
            &config(),
            &notification(vec![Attachment::from_file("/nonexistent/report.pdf")]),
        )
        .await
        .unwrap_err();

        match err {
            EmailError::AttachmentFile { path, source } => {
                assert_eq!(path, "/nonexistent/report.pdf");
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_attachment_is_skipped() {
        let message = build_message(
            &config(),
            &notification(vec![Attachment::new(AttachmentParams::default())]),
        )
        .await
        .unwrap();
        assert!(!formatted(&message).contains("Content-ID"));
    }

    #[tokio::test]
    async fn test_invalid_sender() {
        let server = config().server().clone();
        let err = build_message(&EmailSenderConfig::new(server, "not an address"), &notification(vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, EmailError::Address { .. }));
    }
}
