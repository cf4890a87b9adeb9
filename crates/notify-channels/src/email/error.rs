//! Email channel error types

use std::error::Error as StdError;
use std::io;
use std::time::Duration;

use lettre::address::AddressError;
use thiserror::Error;

/// SMTP reply codes that only occur when the server rejects our credentials
const AUTH_FAILURE_CODES: [u16; 2] = [534, 535];

/// Shared with "STARTTLS required" and other policy refusals; only counts as
/// an authentication failure when the server text says so
const AUTH_REQUIRED_CODE: u16 = 530;

/// Failure reported by a [`MailTransport`](super::MailTransport)
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("timeout after {0:?} waiting for mail server")]
    Timeout(Duration),

    #[error("{0}")]
    Smtp(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<lettre::transport::smtp::Error> for TransportError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        let text = describe(&err);

        if let Some(code) = err.status() {
            if is_authentication_failure(u16::from(code), &text) {
                return Self::Authentication(text);
            }
        }

        if let Some(kind) = io_kind(&err) {
            return Self::Io(io::Error::new(kind, text));
        }

        Self::Smtp(text)
    }
}

/// Anything that can go wrong between a validated notification and an
/// accepted message
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("invalid address `{address}`: {source}")]
    Address {
        address: String,
        #[source]
        source: AddressError,
    },

    #[error("{path}: {source}")]
    AttachmentFile {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid MIME type `{mime}`: {reason}")]
    InvalidMime { mime: String, reason: String },

    #[error("{0}")]
    Message(#[from] lettre::error::Error),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl EmailError {
    pub fn address(address: impl Into<String>, source: AddressError) -> Self {
        Self::Address {
            address: address.into(),
            source,
        }
    }
}

/// Display text of `err` followed by any source messages it does not
/// already include
pub(crate) fn describe(err: &(dyn StdError + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !text.contains(&cause_text) {
            text.push_str(": ");
            text.push_str(&cause_text);
        }
        source = cause.source();
    }
    text
}

fn is_authentication_failure(code: u16, text: &str) -> bool {
    if AUTH_FAILURE_CODES.contains(&code) {
        return true;
    }
    let lower = text.to_lowercase();
    code == AUTH_REQUIRED_CODE && lower.contains("auth") && !lower.contains("starttls")
}

fn io_kind(err: &(dyn StdError + 'static)) -> Option<io::ErrorKind> {
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            return Some(io_err.kind());
        }
        source = cause.source();
    }
    None
}
