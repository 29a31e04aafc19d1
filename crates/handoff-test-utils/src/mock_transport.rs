// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock realtime transport for deterministic testing.
//!
//! Events are injected through an mpsc sender; everything the consumer
//! emits (e.g. the subscription handshake) is captured for assertion.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{mpsc, Mutex};

use handoff_core::{HandoffError, RealtimeTransport, TransportEvent};

/// Record of events emitted back to the "server".
pub type EmittedLog = Arc<Mutex<Vec<(String, Value)>>>;

/// A scriptable mock of the realtime transport.
pub struct MockTransport {
    rx: mpsc::Receiver<TransportEvent>,
    emitted: EmittedLog,
}

impl MockTransport {
    /// Creates a transport plus the feed used to inject events and the log
    /// of emitted events. Dropping the feed shuts the transport down.
    pub fn pair(buffer: usize) -> (Self, mpsc::Sender<TransportEvent>, EmittedLog) {
        let (tx, rx) = mpsc::channel(buffer);
        let emitted: EmittedLog = Arc::default();
        (
            Self {
                rx,
                emitted: Arc::clone(&emitted),
            },
            tx,
            emitted,
        )
    }
}

#[async_trait]
impl RealtimeTransport for MockTransport {
    async fn next_event(&mut self) -> Option<TransportEvent> {
        self.rx.recv().await
    }

    async fn emit(&mut self, name: &str, payload: Value) -> Result<(), HandoffError> {
        self.emitted.lock().await.push((name.to_string(), payload));
        Ok(())
    }
}
