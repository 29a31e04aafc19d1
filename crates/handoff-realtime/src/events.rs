// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed realtime events and the named-event vocabulary.

use handoff_core::{Direction, Message, Thread};

/// Named events exchanged with the realtime channel.
pub mod names {
    /// Connection established (synthesized by the transport).
    pub const CONNECT: &str = "connect";
    /// Connection lost (synthesized by the transport).
    pub const DISCONNECT: &str = "disconnect";
    /// Connection attempt failed (synthesized by the transport).
    pub const CONNECT_ERROR: &str = "connect_error";
    /// A message arrived in some conversation.
    pub const INBOX_MESSAGE: &str = "inbox-message";
    /// A conversation's metadata changed.
    pub const THREAD_UPDATED: &str = "inbox-thread-updated";
    /// Out-of-band channel pairing code for the pairing UI.
    pub const PAIRING_CODE: &str = "pairing-code";
    /// Subscription handshake sent after each successful connect.
    pub const SUBSCRIBE: &str = "subscribe";
}

/// Connection lifecycle as tracked by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "disconnected"),
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Connected => write!(f, "connected"),
        }
    }
}

/// A normalized realtime event, ready for the session controller.
#[derive(Debug, Clone, PartialEq)]
pub enum InboxEvent {
    Connected,
    Disconnected,
    ConnectError(String),
    /// A message in some conversation; merged into the open store and the
    /// directory independently.
    Message {
        contact_id: String,
        message: Message,
        direction: Direction,
    },
    ThreadUpdated(Thread),
    /// Normalized pairing code for the external pairing UI.
    PairingCode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_state_display() {
        assert_eq!(ConnectionState::Disconnected.to_string(), "disconnected");
        assert_eq!(ConnectionState::Connecting.to_string(), "connecting");
        assert_eq!(ConnectionState::Connected.to_string(), "connected");
    }
}
