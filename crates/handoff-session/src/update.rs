// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Snapshots emitted to the UI layer.

use handoff_core::{Message, Thread};
use handoff_realtime::ConnectionState;

/// State snapshot or notification for the rendering layer.
///
/// Read-path failures arrive as [`Banner`] (dismissible, existing state is
/// left intact); write-path failures arrive as [`SendFailed`] or
/// [`TakeoverFailed`] tied to the initiating action.
///
/// [`Banner`]: SessionUpdate::Banner
/// [`SendFailed`]: SessionUpdate::SendFailed
/// [`TakeoverFailed`]: SessionUpdate::TakeoverFailed
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    /// Realtime connection lifecycle changed.
    Connection(ConnectionState),
    /// Directory content or order changed; full snapshot, newest first.
    DirectoryChanged(Vec<Thread>),
    /// The open conversation's rendered message sequence changed.
    MessagesChanged(Vec<Message>),
    /// The open conversation's takeover state changed.
    TakeoverChanged(Thread),
    /// A server-confirmed unread counter landed.
    UnreadChanged { contact_id: String, unread_count: u32 },
    /// Normalized pairing code for the external pairing UI.
    PairingCode(String),
    /// Dismissible error banner; no state was lost.
    Banner(String),
    /// A send was rejected or failed. Any optimistic message stays.
    SendFailed(String),
    /// A takeover request failed; lock state is unchanged.
    TakeoverFailed(String),
}
