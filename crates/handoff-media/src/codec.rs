// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Payload encoding and MIME classification.
//!
//! The backend accepts media as base64 payloads tagged with one of four
//! send categories. Unknown MIME types are rejected rather than guessed.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use handoff_core::{HandoffError, MediaKind};

/// Document MIME types accepted for sending, beyond the image/video/audio
/// prefixes.
const DOCUMENT_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "text/plain",
    "text/csv",
];

/// Classifies a MIME type into an allowed send category.
///
/// Returns `None` for MIME types that may not be sent (e.g. executables,
/// archives, or anything unrecognized).
pub fn classify_mime(mime_type: &str) -> Option<MediaKind> {
    let mime = mime_type.trim().to_ascii_lowercase();
    // Parameters like `; charset=utf-8` do not affect the category.
    let essence = mime.split(';').next().unwrap_or(&mime).trim();

    if essence.starts_with("image/") {
        Some(MediaKind::Image)
    } else if essence.starts_with("video/") {
        Some(MediaKind::Video)
    } else if essence.starts_with("audio/") {
        Some(MediaKind::Audio)
    } else if DOCUMENT_MIME_TYPES.contains(&essence) {
        Some(MediaKind::Document)
    } else {
        None
    }
}

/// Encodes a binary payload for the wire (standard base64 alphabet).
pub fn encode_payload(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decodes a wire payload back into bytes.
pub fn decode_payload(payload: &str) -> Result<Vec<u8>, HandoffError> {
    STANDARD
        .decode(payload.trim())
        .map_err(|e| HandoffError::Decode(format!("invalid base64 payload: {e}")))
}
