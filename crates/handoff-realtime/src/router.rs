// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The event router: one long-lived transport, normalized fan-out.
//!
//! The router is the only component that touches the realtime connection.
//! It is an explicitly owned resource injected at session start and torn
//! down when its transport shuts down, not module-level global state.
//!
//! Fan-out never suspends: listeners receive events over bounded channels
//! via `try_send`, and a full listener drops the event with a warning
//! rather than blocking delivery to the others.

use std::collections::HashMap;

use metrics::counter;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use handoff_core::{RealtimeTransport, TransportEvent};

use crate::events::{names, ConnectionState, InboxEvent};
use crate::normalize;

/// Routes transport events to named listeners.
pub struct EventRouter {
    transport: Box<dyn RealtimeTransport>,
    /// Identity payload for the subscription handshake.
    subscribe_payload: Value,
    state: ConnectionState,
    /// Guards the handshake: set after subscribing, cleared on disconnect,
    /// so repeated `connect` events do not re-subscribe.
    handshake_done: bool,
    last_error: Option<String>,
    listeners: HashMap<String, mpsc::Sender<InboxEvent>>,
}

impl EventRouter {
    /// Creates a router over an injected transport. `subscribe_payload` is
    /// the identity sent in the handshake after each successful connect.
    pub fn new(transport: Box<dyn RealtimeTransport>, subscribe_payload: Value) -> Self {
        Self {
            transport,
            subscribe_payload,
            state: ConnectionState::Connecting,
            handshake_done: false,
            last_error: None,
            listeners: HashMap::new(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Attaches a named listener. Attaching the same name twice replaces
    /// the previous sender, so delivery is never duplicated.
    pub fn attach(&mut self, name: impl Into<String>, sender: mpsc::Sender<InboxEvent>) {
        let name = name.into();
        if self.listeners.insert(name.clone(), sender).is_some() {
            debug!(listener = %name, "replaced existing listener");
        }
    }

    /// Detaches a named listener. Detaching an unknown name is a no-op.
    pub fn detach(&mut self, name: &str) {
        self.listeners.remove(name);
    }

    /// Consumes the router, draining the transport until it shuts down for
    /// good (reconnection attempts exhausted or deliberate close).
    pub async fn run(mut self) {
        while let Some(event) = self.transport.next_event().await {
            self.dispatch(event).await;
        }
        info!("realtime transport closed, router stopping");
    }

    /// Handles a single transport event. Split from [`run`] so tests can
    /// drive the router deterministically.
    ///
    /// [`run`]: EventRouter::run
    pub async fn dispatch(&mut self, event: TransportEvent) {
        counter!("handoff_realtime_events_total", "event" => event.name.clone()).increment(1);

        match event.name.as_str() {
            names::CONNECT => {
                self.state = ConnectionState::Connected;
                if !self.handshake_done {
                    match self
                        .transport
                        .emit(names::SUBSCRIBE, self.subscribe_payload.clone())
                        .await
                    {
                        Ok(()) => {
                            self.handshake_done = true;
                            debug!("subscription handshake sent");
                        }
                        Err(e) => warn!(error = %e, "subscription handshake failed"),
                    }
                }
                self.fan_out(InboxEvent::Connected);
            }
            names::DISCONNECT => {
                self.state = ConnectionState::Disconnected;
                self.handshake_done = false;
                self.fan_out(InboxEvent::Disconnected);
            }
            names::CONNECT_ERROR => {
                let message = normalize::error_message(&event.payload);
                self.last_error = Some(message.clone());
                self.state = ConnectionState::Disconnected;
                self.handshake_done = false;
                self.fan_out(InboxEvent::ConnectError(message));
            }
            names::INBOX_MESSAGE => match normalize::message_event(&event.payload) {
                Some((contact_id, message, direction)) => {
                    self.fan_out(InboxEvent::Message {
                        contact_id,
                        message,
                        direction,
                    });
                }
                None => self.record_dropped(names::INBOX_MESSAGE),
            },
            names::THREAD_UPDATED => match normalize::thread_update(&event.payload) {
                Some(thread) => self.fan_out(InboxEvent::ThreadUpdated(thread)),
                None => self.record_dropped(names::THREAD_UPDATED),
            },
            names::PAIRING_CODE => {
                self.fan_out(InboxEvent::PairingCode(normalize::pairing_code(
                    &event.payload,
                )));
            }
            other => debug!(event = %other, "ignoring unrecognized event"),
        }
    }

    fn record_dropped(&self, event: &'static str) {
        counter!("handoff_realtime_events_dropped_total", "event" => event).increment(1);
    }

    fn fan_out(&self, event: InboxEvent) {
        for (name, sender) in &self.listeners {
            if let Err(e) = sender.try_send(event.clone()) {
                warn!(listener = %name, error = %e, "listener channel full, event dropped");
            }
        }
    }
}
