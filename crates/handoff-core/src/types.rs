// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common domain types shared across the Handoff workspace.
//!
//! The inbox is a client-side projection of backend state: threads and
//! messages carry no guaranteed server-assigned ids, so message identity
//! is the dedup tuple (timestamp, role, content, media signature).

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Messaging channel a conversation lives on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    WhatsApp,
    Instagram,
    Facebook,
}

/// Stable identity of a conversation: one contact talking to one agent on
/// one channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadKey {
    pub agent_id: String,
    pub channel: Channel,
    pub contact_id: String,
}

/// Who authored a message relative to the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Inbound from the contact.
    User,
    /// Outbound from the bot or a human operator.
    Assistant,
}

/// Whether an outbound message came from the automated agent or a human
/// operator who had taken the conversation over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageSource {
    Human,
    Bot,
}

/// Direction of the latest activity on a thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Inbound,
    Outbound,
}

/// Media category allowed for sending.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Audio,
    Document,
}

/// Describes media attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaDescriptor {
    pub kind: MediaKind,
    pub mime_type: String,
}

impl MediaDescriptor {
    /// Stable signature used as the media component of the dedup tuple.
    pub fn signature(&self) -> String {
        format!("{}:{}", self.kind, self.mime_type)
    }
}

/// A single message in a conversation.
///
/// The backend assigns no unique message id; the timestamp is the only
/// reliable sortable field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub role: MessageRole,
    /// Message text. Empty for pure-media messages.
    #[serde(default)]
    pub content: String,
    /// Epoch milliseconds.
    pub timestamp_ms: i64,
    /// Present on outbound messages when the origin is known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<MessageSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaDescriptor>,
}

/// Identity tuple used to recognize the "same" message arriving from two
/// sources (history fetch vs realtime echo, or an optimistic local insert).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub timestamp_ms: i64,
    pub role: MessageRole,
    pub content: String,
    pub media_signature: Option<String>,
}

impl Message {
    /// Computes the dedup tuple for this message.
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            timestamp_ms: self.timestamp_ms,
            role: self.role,
            content: self.content.clone(),
            media_signature: self.media.as_ref().map(MediaDescriptor::signature),
        }
    }

    /// Direction implied by the role: user messages are inbound, assistant
    /// messages outbound.
    pub fn direction(&self) -> Direction {
        match self.role {
            MessageRole::User => Direction::Inbound,
            MessageRole::Assistant => Direction::Outbound,
        }
    }
}

/// Who currently owns the right to send into a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TakeoverMode {
    Bot,
    Human,
}

/// Per-thread lock state. Always read and written atomically with the
/// thread it is embedded in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TakeoverState {
    pub mode: TakeoverMode,
    /// Operator holding the human lock. Meaningful only when mode is Human.
    #[serde(default)]
    pub lock_holder: Option<String>,
    #[serde(default)]
    pub locked_at_ms: Option<i64>,
}

impl Default for TakeoverState {
    fn default() -> Self {
        Self {
            mode: TakeoverMode::Bot,
            lock_holder: None,
            locked_at_ms: None,
        }
    }
}

/// A conversation as shown in the inbox directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    #[serde(flatten)]
    pub key: ThreadKey,
    #[serde(default)]
    pub display_name: Option<String>,
    /// Epoch milliseconds of the last message.
    pub last_message_at_ms: i64,
    /// Preview text of the last message.
    #[serde(default)]
    pub preview: String,
    pub last_direction: Direction,
    #[serde(default)]
    pub unread_count: u32,
    #[serde(default)]
    pub takeover: TakeoverState,
}

impl Thread {
    /// A minimal thread entry for a contact first seen through a realtime
    /// event, before any directory listing named it.
    pub fn placeholder(key: ThreadKey, last_message_at_ms: i64) -> Self {
        Self {
            key,
            display_name: None,
            last_message_at_ms,
            preview: String::new(),
            last_direction: Direction::Inbound,
            unread_count: 0,
            takeover: TakeoverState::default(),
        }
    }

    /// Title shown for the thread: the display name when present, otherwise
    /// a formatted contact identifier (channel address with any transport
    /// suffix stripped).
    pub fn display_title(&self) -> String {
        if let Some(name) = &self.display_name
            && !name.trim().is_empty()
        {
            return name.clone();
        }
        format_contact_id(&self.key.contact_id)
    }
}

/// Strips the transport suffix from a raw contact identifier and prefixes
/// purely numeric addresses with `+` (e.g. `5511999990000@c.us` becomes
/// `+5511999990000`).
pub fn format_contact_id(contact_id: &str) -> String {
    let bare = contact_id.split('@').next().unwrap_or(contact_id);
    if !bare.is_empty() && bare.chars().all(|c| c.is_ascii_digit()) {
        format!("+{bare}")
    } else {
        bare.to_string()
    }
}
