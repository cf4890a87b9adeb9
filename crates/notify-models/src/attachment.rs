//! Attachment Model

use std::path::Path;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::json::AttachmentJson;

/// Construction parameters for an [`Attachment`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachmentParams {
    /// Filesystem path or display filename
    pub file: Option<String>,
    /// Declared MIME type
    pub mime: Option<String>,
    /// Raw payload
    pub data: Option<Vec<u8>>,
}

/// An immutable attachment.
///
/// Either `data` or `file` is expected to be set for a channel to make use of
/// it, but that is checked by the consuming channel, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "AttachmentJson", try_from = "AttachmentJson")]
pub struct Attachment {
    file: Option<String>,
    mime: Option<String>,
    data: Option<Bytes>,
}

impl Attachment {
    pub fn new(params: AttachmentParams) -> Self {
        Self {
            file: params.file,
            mime: params.mime,
            data: params.data.filter(|d| !d.is_empty()).map(Bytes::from),
        }
    }

    /// Attachment carrying an in-memory payload
    pub fn from_bytes(file: impl Into<String>, mime: impl Into<String>, data: &[u8]) -> Self {
        Self::new(AttachmentParams {
            file: Some(file.into()),
            mime: Some(mime.into()),
            data: Some(data.to_vec()),
        })
    }

    /// Attachment referencing a file on disk
    pub fn from_file(path: impl Into<String>) -> Self {
        Self::new(AttachmentParams {
            file: Some(path.into()),
            ..Default::default()
        })
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    pub fn mime(&self) -> Option<&str> {
        self.mime.as_deref()
    }

    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    /// Shared handle to the payload
    pub fn data_bytes(&self) -> Option<Bytes> {
        self.data.clone()
    }

    /// Whether `file` is set to something other than whitespace
    pub fn has_file(&self) -> bool {
        self.file.as_deref().is_some_and(|f| !f.trim().is_empty())
    }

    /// Last path component of `file`
    pub fn file_name(&self) -> Option<String> {
        let file = self.file.as_deref()?;
        Path::new(file)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
    }

    /// Identifier used to reference this attachment from the message body
    /// (`cid:` URLs).
    ///
    /// Path separators and whitespace in `file` become `_`. Without a usable
    /// `file`, every call returns a fresh random token.
    pub fn content_id(&self) -> String {
        match self.file.as_deref().filter(|f| !f.trim().is_empty()) {
            Some(file) => file
                .chars()
                .map(|c| {
                    if c == '/' || c == '\\' || c.is_whitespace() {
                        '_'
                    } else {
                        c
                    }
                })
                .collect(),
            None => uuid::Uuid::new_v4().to_string(),
        }
    }
}
