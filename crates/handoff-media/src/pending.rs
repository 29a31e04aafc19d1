// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The transient, client-only attachment awaiting send.
//!
//! At most one pending attachment exists per session; selecting a new one
//! replaces the previous and releases its preview resource. The value is
//! destroyed on successful send or explicit discard.

use tracing::debug;

use handoff_core::{HandoffError, MediaKind, SendBody};

use crate::codec;

/// Handle to a client-side preview resource for a selected file.
///
/// The underlying resource is released when the handle is dropped, which
/// happens when the attachment is replaced, discarded, or sent.
#[derive(Debug)]
pub struct PreviewHandle {
    token: String,
}

impl PreviewHandle {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        debug!(token = %self.token, "released attachment preview");
    }
}

/// A selected but unsent attachment.
#[derive(Debug)]
pub struct PendingAttachment {
    kind: MediaKind,
    data: Vec<u8>,
    mime_type: String,
    caption: Option<String>,
    preview: Option<PreviewHandle>,
}

impl PendingAttachment {
    /// Builds a pending attachment from a selected file.
    ///
    /// Fails if the MIME type is not in an allowed send category.
    pub fn from_bytes(
        data: Vec<u8>,
        mime_type: impl Into<String>,
        caption: Option<String>,
        preview: Option<PreviewHandle>,
    ) -> Result<Self, HandoffError> {
        let mime_type = mime_type.into();
        let kind = codec::classify_mime(&mime_type).ok_or_else(|| {
            HandoffError::Decode(format!("unsupported attachment mime type: {mime_type}"))
        })?;
        Ok(Self {
            kind,
            data,
            mime_type,
            caption,
            preview,
        })
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    pub fn preview(&self) -> Option<&PreviewHandle> {
        self.preview.as_ref()
    }

    /// Builds the tagged wire body for this attachment without consuming it,
    /// so a failed send can keep the attachment around for retry.
    pub fn to_send_body(&self) -> SendBody {
        let payload = codec::encode_payload(&self.data);
        match self.kind {
            MediaKind::Image => SendBody::Image {
                payload,
                mime_type: self.mime_type.clone(),
                caption: self.caption.clone(),
            },
            MediaKind::Video => SendBody::Video {
                payload,
                mime_type: self.mime_type.clone(),
                caption: self.caption.clone(),
            },
            MediaKind::Audio => SendBody::Audio {
                payload,
                mime_type: self.mime_type.clone(),
            },
            MediaKind::Document => SendBody::Document {
                payload,
                mime_type: self.mime_type.clone(),
                filename: None,
                caption: self.caption.clone(),
            },
        }
    }
}
