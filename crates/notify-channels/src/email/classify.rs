//! Retryable/permanent classification of email failures
//!
//! Every [`EmailError`] maps to exactly one [`SendFailure`]. Unknown
//! transport trouble is treated as retryable so that a transient outage is
//! never dropped for good.

use std::io;

use notify_core::SendFailure;

use super::error::{EmailError, TransportError};

/// Server text that indicates a transient condition
pub const RETRYABLE_INDICATORS: &[&str] = &[
    "timeout",
    "connection refused",
    "connection reset",
    "network is unreachable",
    "temporary failure",
    "try again later",
    "service unavailable",
    "server busy",
];

/// Server text that indicates the message will never be accepted
pub const PERMANENT_INDICATORS: &[&str] = &[
    "invalid recipient",
    "user unknown",
    "mailbox unavailable",
    "permanent failure",
    "message too large",
    "quota exceeded",
    "relay access denied",
];

const FILE_ACCESS_INDICATORS: &[&str] = &["permission denied", "access denied", "file not found"];

/// Classify an email failure, keeping the original error as the cause
pub fn classify(error: EmailError) -> SendFailure {
    let failure = match &error {
        EmailError::Address { .. } => SendFailure::permanent("Invalid email address format"),
        EmailError::AttachmentFile { path, source } => match source.kind() {
            io::ErrorKind::NotFound => {
                SendFailure::permanent(format!("Attachment file not found: {}", path))
            }
            io::ErrorKind::PermissionDenied => {
                SendFailure::permanent(format!("Access denied to attachment file: {}", path))
            }
            _ => SendFailure::permanent(format!("File access error: {}: {}", path, source)),
        },
        EmailError::InvalidMime { .. } | EmailError::Message(_) => {
            SendFailure::permanent(format!("Invalid notification configuration: {}", error))
        }
        EmailError::Transport(TransportError::Authentication(_)) => {
            SendFailure::permanent("SMTP authentication failed")
        }
        EmailError::Transport(TransportError::Io(source)) => classify_io(source),
        EmailError::Transport(transport) => classify_transport_message(&transport.to_string()),
    };
    failure.with_cause(error)
}

/// Classify server or protocol text by keyword. Retryable keywords win over
/// permanent ones; text matching neither is retryable.
pub fn classify_transport_message(text: &str) -> SendFailure {
    let lower = text.to_lowercase();

    if contains_any(&lower, RETRYABLE_INDICATORS) {
        SendFailure::retryable(format!("Temporary server issue: {}", text))
    } else if contains_any(&lower, PERMANENT_INDICATORS) {
        SendFailure::permanent(format!("Permanent delivery failure: {}", text))
    } else {
        SendFailure::retryable(format!("SMTP communication error: {}", text))
    }
}

/// Classify an I/O error raised while reading attachments or talking to the
/// server
pub fn classify_io(err: &io::Error) -> SendFailure {
    use io::ErrorKind::*;

    match err.kind() {
        ConnectionRefused | ConnectionReset | ConnectionAborted | TimedOut | AddrNotAvailable
        | NotConnected => SendFailure::retryable(format!("Network connection error: {}", err)),
        NotFound => SendFailure::permanent(format!("Attachment file not found: {}", err)),
        _ if contains_any(&err.to_string().to_lowercase(), FILE_ACCESS_INDICATORS) => {
            SendFailure::permanent(format!("File access error: {}", err))
        }
        _ => SendFailure::retryable(format!("IO error during email sending: {}", err)),
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify_core::FailureKind;
    use std::time::Duration;

    fn smtp(text: &str) -> EmailError {
        EmailError::Transport(TransportError::Smtp(text.to_string()))
    }

    #[test]
    fn test_retryable_keywords() {
        for text in [
            "421 Service unavailable, closing channel",
            "451 Temporary failure, please try again later",
            "Connection reset by peer",
            "read timeout",
            "Server busy",
        ] {
            let failure = classify(smtp(text));
            assert!(failure.is_retryable(), "{}", text);
            assert!(failure.message().starts_with("Temporary server issue: "));
        }
    }

    #[test]
    fn test_permanent_keywords() {
        for text in [
            "550 5.1.1 User unknown",
            "550 Mailbox unavailable",
            "552 Message too large",
            "554 Relay access denied",
            "552 Quota exceeded",
        ] {
            let failure = classify(smtp(text));
            assert!(failure.is_permanent(), "{}", text);
            assert_eq!(failure.message(), format!("Permanent delivery failure: {}", text));
        }
    }

    #[test]
    fn test_retryable_keyword_wins() {
        let failure = classify_transport_message("Mailbox unavailable, try again later");
        assert!(failure.is_retryable());
    }

    #[test]
    fn test_unknown_transport_text_is_retryable() {
        let failure = classify(smtp("unexpected reply from server"));
        assert_eq!(failure.kind(), FailureKind::Retryable);
        assert_eq!(
            failure.message(),
            "SMTP communication error: unexpected reply from server"
        );
        assert!(failure.cause().is_some());
    }

    #[test]
    fn test_transport_timeout_is_retryable() {
        let failure = classify(EmailError::Transport(TransportError::Timeout(
            Duration::from_secs(60),
        )));
        assert!(failure.is_retryable());
    }

    #[test]
    fn test_authentication_is_permanent() {
        let failure = classify(EmailError::Transport(TransportError::Authentication(
            "535 5.7.8 bad credentials".into(),
        )));
        assert!(failure.is_permanent());
        assert_eq!(failure.message(), "SMTP authentication failed");
    }

    #[test]
    fn test_invalid_address_is_permanent() {
        let source = "not-an-address".parse::<lettre::Address>().unwrap_err();
        let failure = classify(EmailError::address("not-an-address", source));
        assert!(failure.is_permanent());
        assert_eq!(failure.message(), "Invalid email address format");
    }

    #[test]
    fn test_attachment_file_errors() {
        let missing = classify(EmailError::AttachmentFile {
            path: "/data/report.pdf".into(),
            source: io::Error::new(io::ErrorKind::NotFound, "No such file"),
        });
        assert!(missing.is_permanent());
        assert_eq!(missing.message(), "Attachment file not found: /data/report.pdf");

        let denied = classify(EmailError::AttachmentFile {
            path: "/data/report.pdf".into(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "Permission denied"),
        });
        assert!(denied.is_permanent());
        assert_eq!(denied.message(), "Access denied to attachment file: /data/report.pdf");

        let unreadable = classify(EmailError::AttachmentFile {
            path: "/data".into(),
            source: io::Error::new(io::ErrorKind::Other, "Is a directory (os error 21)"),
        });
        assert!(unreadable.is_permanent());
        assert_eq!(
            unreadable.message(),
            "File access error: /data: Is a directory (os error 21)"
        );
    }

    #[test]
    fn test_io_errors() {
        let refused = classify(EmailError::Transport(TransportError::Io(io::Error::new(
            io::ErrorKind::ConnectionRefused,
            "Connection refused",
        ))));
        assert!(refused.is_retryable());
        assert!(refused.message().starts_with("Network connection error: "));

        let access = classify_io(&io::Error::new(io::ErrorKind::Other, "Access denied by policy"));
        assert!(access.is_permanent());
        assert!(access.message().starts_with("File access error: "));

        let other = classify_io(&io::Error::new(io::ErrorKind::Other, "broken pipe"));
        assert!(other.is_retryable());
        assert_eq!(other.message(), "IO error during email sending: broken pipe");
    }

    #[test]
    fn test_invalid_mime_is_permanent() {
        let failure = classify(EmailError::InvalidMime {
            mime: "not a mime".into(),
            reason: "bad".into(),
        });
        assert!(failure.is_permanent());
        assert!(failure
            .message()
            .starts_with("Invalid notification configuration: "));
    }
}
