// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Realtime transport seam: a long-lived push connection delivering named
//! events with JSON payloads.
//!
//! Connection lifecycle is reported through the same stream as data events,
//! using the reserved names `connect`, `disconnect`, and `connect_error`.
//! Reconnection (bounded attempts, fixed backoff) is the transport's job;
//! consumers only react to the synthesized lifecycle events.

use async_trait::async_trait;

use crate::error::HandoffError;

/// A named event with its raw JSON payload, exactly as the transport
/// delivered it. Payload shape normalization happens downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportEvent {
    pub name: String,
    pub payload: serde_json::Value,
}

impl TransportEvent {
    pub fn new(name: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }
}

/// Push collaborator owned by the event router. One instance per process;
/// injected at session start and torn down with it.
#[async_trait]
pub trait RealtimeTransport: Send {
    /// Returns the next event, or `None` once the transport has shut down
    /// for good (reconnection attempts exhausted or deliberate close).
    async fn next_event(&mut self) -> Option<TransportEvent>;

    /// Sends a named event to the server. Used for the subscription
    /// handshake after each successful connect.
    async fn emit(
        &mut self,
        name: &str,
        payload: serde_json::Value,
    ) -> Result<(), HandoffError>;
}
