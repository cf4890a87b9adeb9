//! Core error types for notify-rs
//!
//! A delivery attempt either succeeds or fails with a [`SendFailure`]. The
//! failure carries a `retryable` tag that callers branch on when deciding
//! whether to resubmit the same notification later.

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

/// Boxed underlying cause of a failure
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Classification of a failed delivery attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The condition is plausibly transient; the caller may resubmit later
    Retryable,
    /// Resubmitting the same notification will not help
    Permanent,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Retryable => "retryable",
            Self::Permanent => "permanent",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified delivery failure.
///
/// There is exactly one failure type; retryable and permanent failures differ
/// only in their [`FailureKind`].
#[derive(Debug, Error)]
#[error("{message}")]
pub struct SendFailure {
    message: String,
    kind: FailureKind,
    #[source]
    cause: Option<BoxError>,
}

impl SendFailure {
    /// Create a failure of the given kind
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
            cause: None,
        }
    }

    /// Create a retryable failure
    pub fn retryable(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Retryable, message)
    }

    /// Create a permanent failure
    pub fn permanent(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Permanent, message)
    }

    /// Attach the underlying cause
    pub fn with_cause(mut self, cause: impl Into<BoxError>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    pub fn is_retryable(&self) -> bool {
        self.kind == FailureKind::Retryable
    }

    pub fn is_permanent(&self) -> bool {
        self.kind == FailureKind::Permanent
    }

    /// The underlying cause, if one was recorded
    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }
}

/// Configuration error, raised when channel configuration is built
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
    #[error("Missing required setting: {0}")]
    Missing(String),
}

impl ConfigError {
    pub fn invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_kinds() {
        let retry = SendFailure::retryable("server busy");
        assert!(retry.is_retryable());
        assert!(!retry.is_permanent());
        assert_eq!(retry.kind(), FailureKind::Retryable);

        let perm = SendFailure::permanent("bad address");
        assert!(perm.is_permanent());
        assert_eq!(perm.kind().to_string(), "permanent");
    }

    #[test]
    fn test_failure_keeps_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.pdf");
        let failure = SendFailure::permanent("Attachment file not found: missing.pdf").with_cause(io);

        assert_eq!(failure.to_string(), "Attachment file not found: missing.pdf");
        let source = failure.source().expect("cause is exposed as source");
        assert_eq!(source.to_string(), "missing.pdf");
        assert!(source.downcast_ref::<std::io::Error>().is_some());
        assert!(failure.cause().is_some());
    }

    #[test]
    fn test_failure_without_cause() {
        let failure = SendFailure::retryable("timeout");
        assert!(failure.source().is_none());
        assert_eq!(failure.message(), "timeout");
    }

    #[test]
    fn test_config_error_message() {
        let err = ConfigError::invalid("SMTP_PORT", "must not exceed 65535");
        assert_eq!(err.to_string(), "Invalid value for SMTP_PORT: must not exceed 65535");
    }
}
