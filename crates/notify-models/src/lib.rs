//! # notify-models
//!
//! Immutable value types consumed by every delivery channel.
//!
//! - [`Notification`]: message, recipients and metadata
//! - [`Attachment`]: inline bytes or a file reference, with content-ID derivation
//! - [`json`]: the JSON wire format and its [`ParseError`]

pub mod attachment;
pub mod json;
pub mod notification;

pub use attachment::{Attachment, AttachmentParams};
pub use json::{from_json, to_json, ParseError};
pub use notification::{ModelError, Notification, NotificationParams};
