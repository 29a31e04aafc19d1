// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Handoff inbox coordinator.

use thiserror::Error;

/// The primary error type used across all Handoff trait seams and core operations.
#[derive(Debug, Error)]
pub enum HandoffError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport errors (connection drop, request failure). These are retried
    /// by the transport itself or surfaced as a dismissible banner; they are
    /// never fatal to the session.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The backend rejected or failed a request with a non-2xx response.
    #[error("backend returned {status}: {message}")]
    Backend { status: u16, message: String },

    /// Sending is not legal for the requesting operator: the conversation is
    /// in bot mode or the human lock is held by someone else.
    #[error("send denied: {}", .holder.as_deref().unwrap_or("conversation is in bot mode"))]
    LockDenied { holder: Option<String> },

    /// A payload could not be decoded into a known shape. Raised only at
    /// decode boundaries; event routing drops malformed payloads instead of
    /// propagating this.
    #[error("decode error: {0}")]
    Decode(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
