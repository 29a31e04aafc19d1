// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Attachment handling for the Handoff inbox coordinator.
//!
//! Converts binary payloads to and from the wire encoding and classifies
//! MIME types into the categories the backend accepts for sending.

pub mod codec;
pub mod pending;

pub use codec::{classify_mime, decode_payload, encode_payload};
pub use pending::{PendingAttachment, PreviewHandle};
