// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! REST backend seam: listing threads, fetching history, mark-as-read,
//! takeover transitions, and sending.
//!
//! The coordinator is a client-side projection; every operation here is a
//! suspension point and every returned value is authoritative server state.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::HandoffError;
use crate::types::{Channel, MediaKind, Message, TakeoverMode, Thread};

/// Query for one page of conversation history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    pub channel: Channel,
    /// Maximum number of messages to return.
    pub limit: u32,
    /// Exclusive upper bound on message timestamps; used for backward
    /// pagination with the current oldest timestamp as the cursor.
    pub before_ms: Option<i64>,
}

/// One page of history plus the server's current view of the thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPage {
    pub thread: Thread,
    pub messages: Vec<Message>,
}

/// Server-confirmed unread counter after a mark-read request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadReceipt {
    pub unread_count: u32,
}

/// Server-confirmed result of a takeover transition. The client applies
/// exactly this; it never flips lock state optimistically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TakeoverOutcome {
    pub mode: TakeoverMode,
    pub thread: Thread,
}

/// Tagged send body. Media payloads are carried base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SendBody {
    Text {
        text: String,
    },
    Image {
        payload: String,
        mime_type: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    Video {
        payload: String,
        mime_type: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    Audio {
        payload: String,
        mime_type: String,
    },
    Document {
        payload: String,
        mime_type: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filename: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
}

impl SendBody {
    /// Media category of this body, if it carries media.
    pub fn media_kind(&self) -> Option<MediaKind> {
        match self {
            SendBody::Text { .. } => None,
            SendBody::Image { .. } => Some(MediaKind::Image),
            SendBody::Video { .. } => Some(MediaKind::Video),
            SendBody::Audio { .. } => Some(MediaKind::Audio),
            SendBody::Document { .. } => Some(MediaKind::Document),
        }
    }
}

/// REST collaborator the session controller drives.
#[async_trait]
pub trait InboxBackend: Send + Sync {
    /// Lists the threads for an (agent, channel) scope, newest first.
    async fn list_threads(
        &self,
        agent_id: &str,
        channel: Channel,
        limit: u32,
    ) -> Result<Vec<Thread>, HandoffError>;

    /// Fetches one page of history for a conversation.
    async fn thread_messages(
        &self,
        agent_id: &str,
        contact_id: &str,
        query: HistoryQuery,
    ) -> Result<HistoryPage, HandoffError>;

    /// Marks a conversation read and returns the confirmed unread counter.
    async fn mark_read(
        &self,
        agent_id: &str,
        contact_id: &str,
        expected_unread: u32,
        channel: Channel,
    ) -> Result<ReadReceipt, HandoffError>;

    /// Requests a takeover transition and returns the confirmed state.
    async fn takeover(
        &self,
        agent_id: &str,
        contact_id: &str,
        mode: TakeoverMode,
        force: bool,
        channel: Channel,
    ) -> Result<TakeoverOutcome, HandoffError>;

    /// Sends a message into a conversation.
    async fn send(
        &self,
        agent_id: &str,
        contact_id: &str,
        body: SendBody,
        channel: Channel,
    ) -> Result<(), HandoffError>;
}
