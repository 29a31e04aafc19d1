// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WebSocket transport for the realtime channel.
//!
//! Frames are JSON objects `{"event": <name>, "data": <payload>}` in both
//! directions. The transport synthesizes the `connect`, `disconnect`, and
//! `connect_error` lifecycle events and handles reconnection itself, with
//! a bounded attempt count and a fixed backoff delay per disconnection
//! episode. Once attempts are exhausted `next_event` returns `None` and
//! the transport is done for good.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};

use handoff_core::{HandoffError, RealtimeTransport, TransportEvent};

use crate::events::names;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Realtime transport over a WebSocket connection.
pub struct WsTransport {
    url: String,
    max_attempts: u32,
    retry_delay: Duration,
    attempts: u32,
    stream: Option<WsStream>,
    /// Lifecycle events synthesized ahead of the next read.
    pending: VecDeque<TransportEvent>,
}

impl WsTransport {
    pub fn new(url: impl Into<String>, max_attempts: u32, retry_delay: Duration) -> Self {
        Self {
            url: url.into(),
            max_attempts: max_attempts.max(1),
            retry_delay,
            attempts: 0,
            stream: None,
            pending: VecDeque::new(),
        }
    }

    async fn try_connect(&mut self) -> Option<TransportEvent> {
        if self.attempts >= self.max_attempts {
            warn!(
                attempts = self.attempts,
                "reconnection attempts exhausted, transport shutting down"
            );
            return None;
        }
        if self.attempts > 0 {
            tokio::time::sleep(self.retry_delay).await;
        }
        self.attempts += 1;

        match connect_async(self.url.as_str()).await {
            Ok((stream, _response)) => {
                debug!(url = %self.url, "websocket connected");
                self.stream = Some(stream);
                self.attempts = 0;
                Some(TransportEvent::new(names::CONNECT, Value::Null))
            }
            Err(e) => {
                warn!(url = %self.url, error = %e, "websocket connect failed");
                Some(TransportEvent::new(
                    names::CONNECT_ERROR,
                    json!({ "message": e.to_string() }),
                ))
            }
        }
    }
}

#[async_trait]
impl RealtimeTransport for WsTransport {
    async fn next_event(&mut self) -> Option<TransportEvent> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }

            let Some(stream) = self.stream.as_mut() else {
                return self.try_connect().await;
            };

            match stream.next().await {
                Some(Ok(WsMessage::Text(text))) => match parse_frame(text.as_str()) {
                    Some(event) => return Some(event),
                    None => debug!("unparsable frame skipped"),
                },
                Some(Ok(WsMessage::Close(_))) | None => {
                    debug!("websocket closed by peer");
                    self.stream = None;
                    return Some(TransportEvent::new(names::DISCONNECT, Value::Null));
                }
                Some(Ok(_)) => {
                    // Binary, ping, and pong frames carry no events.
                }
                Some(Err(e)) => {
                    warn!(error = %e, "websocket read error");
                    self.stream = None;
                    self.pending.push_back(TransportEvent::new(
                        names::CONNECT_ERROR,
                        json!({ "message": e.to_string() }),
                    ));
                    return Some(TransportEvent::new(names::DISCONNECT, Value::Null));
                }
            }
        }
    }

    async fn emit(&mut self, name: &str, payload: Value) -> Result<(), HandoffError> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(HandoffError::Transport {
                message: "emit while disconnected".into(),
                source: None,
            });
        };
        let frame = json!({ "event": name, "data": payload }).to_string();
        stream
            .send(WsMessage::Text(frame.into()))
            .await
            .map_err(|e| HandoffError::Transport {
                message: format!("websocket send failed: {e}"),
                source: Some(Box::new(e)),
            })
    }
}

#[derive(Debug, Deserialize)]
struct Frame {
    event: String,
    #[serde(default)]
    data: Value,
}

/// Parses one inbound frame. Returns `None` for frames that are not the
/// expected JSON shape; the transport skips them.
fn parse_frame(text: &str) -> Option<TransportEvent> {
    serde_json::from_str::<Frame>(text)
        .ok()
        .map(|frame| TransportEvent::new(frame.event, frame.data))
}
