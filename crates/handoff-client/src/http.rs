// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the inbox backend API.
//!
//! Provides [`HttpInboxBackend`] which handles request construction,
//! bearer authentication, JSON bodies, and transient error retry
//! (429, 500, 503) with a fixed one-second delay.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use handoff_core::{
    Channel, HandoffError, HistoryPage, HistoryQuery, InboxBackend, ReadReceipt, SendBody,
    TakeoverMode, TakeoverOutcome, Thread,
};

/// HTTP implementation of the inbox backend contract.
#[derive(Debug, Clone)]
pub struct HttpInboxBackend {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
}

impl HttpInboxBackend {
    /// Creates a backend client.
    ///
    /// # Arguments
    /// * `base_url` - API root, without a trailing slash
    /// * `api_token` - optional bearer token for the `Authorization` header
    /// * `timeout` - per-request timeout
    pub fn new(
        base_url: impl Into<String>,
        api_token: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, HandoffError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = api_token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| HandoffError::Config(format!("invalid API token: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| HandoffError::Transport {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_retries: 1,
        })
    }

    /// Sends a request, retrying transient failures once, and decodes the
    /// JSON response.
    async fn request_json<R: DeserializeOwned>(
        &self,
        method: Method,
        path: String,
        query: &[(&str, String)],
        body: Option<serde_json::Value>,
    ) -> Result<R, HandoffError> {
        let url = format!("{}{path}", self.base_url);

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, url = %url, "retrying request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let mut request = self.client.request(method.clone(), &url).query(query);
            if let Some(ref body) = body {
                request = request.json(body);
            }

            let response = request.send().await.map_err(|e| HandoffError::Transport {
                message: format!("request to {url} failed: {e}"),
                source: Some(Box::new(e)),
            })?;

            let status = response.status();
            debug!(status = %status, attempt, url = %url, "response received");

            if status.is_success() {
                return response.json().await.map_err(|e| HandoffError::Decode(format!(
                    "invalid response body from {url}: {e}"
                )));
            }

            if is_transient(status) && attempt < self.max_retries {
                continue;
            }

            let message = error_body(response).await;
            return Err(HandoffError::Backend {
                status: status.as_u16(),
                message,
            });
        }
        unreachable!("retry loop always returns")
    }
}

fn is_transient(status: StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503)
}

/// Extracts a human-readable message from an error response body, falling
/// back to the raw text.
async fn error_body(response: reqwest::Response) -> String {
    let text = response.text().await.unwrap_or_default();
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(&text)
        && let Some(message) = value
            .get("message")
            .or_else(|| value.get("error"))
            .and_then(|v| v.as_str())
    {
        return message.to_string();
    }
    text
}

#[derive(Debug, Deserialize)]
struct SendAck {
    ok: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MarkReadBody {
    expected_unread: u32,
}

#[derive(Debug, Serialize)]
struct TakeoverBody {
    mode: TakeoverMode,
    force: bool,
}

#[async_trait]
impl InboxBackend for HttpInboxBackend {
    async fn list_threads(
        &self,
        agent_id: &str,
        channel: Channel,
        limit: u32,
    ) -> Result<Vec<Thread>, HandoffError> {
        self.request_json(
            Method::GET,
            format!("/agents/{agent_id}/threads"),
            &[
                ("channel", channel.to_string()),
                ("limit", limit.to_string()),
            ],
            None,
        )
        .await
    }

    async fn thread_messages(
        &self,
        agent_id: &str,
        contact_id: &str,
        query: HistoryQuery,
    ) -> Result<HistoryPage, HandoffError> {
        let mut params = vec![
            ("channel", query.channel.to_string()),
            ("limit", query.limit.to_string()),
        ];
        if let Some(before) = query.before_ms {
            params.push(("before", before.to_string()));
        }
        self.request_json(
            Method::GET,
            format!("/agents/{agent_id}/contacts/{contact_id}/messages"),
            &params,
            None,
        )
        .await
    }

    async fn mark_read(
        &self,
        agent_id: &str,
        contact_id: &str,
        expected_unread: u32,
        channel: Channel,
    ) -> Result<ReadReceipt, HandoffError> {
        self.request_json(
            Method::POST,
            format!("/agents/{agent_id}/contacts/{contact_id}/read"),
            &[("channel", channel.to_string())],
            Some(serde_json::to_value(MarkReadBody { expected_unread }).map_err(
                |e| HandoffError::Internal(format!("serialize mark-read body: {e}")),
            )?),
        )
        .await
    }

    async fn takeover(
        &self,
        agent_id: &str,
        contact_id: &str,
        mode: TakeoverMode,
        force: bool,
        channel: Channel,
    ) -> Result<TakeoverOutcome, HandoffError> {
        self.request_json(
            Method::POST,
            format!("/agents/{agent_id}/contacts/{contact_id}/takeover"),
            &[("channel", channel.to_string())],
            Some(serde_json::to_value(TakeoverBody { mode, force }).map_err(
                |e| HandoffError::Internal(format!("serialize takeover body: {e}")),
            )?),
        )
        .await
    }

    async fn send(
        &self,
        agent_id: &str,
        contact_id: &str,
        body: SendBody,
        channel: Channel,
    ) -> Result<(), HandoffError> {
        let ack: SendAck = self
            .request_json(
                Method::POST,
                format!("/agents/{agent_id}/contacts/{contact_id}/messages"),
                &[("channel", channel.to_string())],
                Some(serde_json::to_value(&body).map_err(|e| {
                    HandoffError::Internal(format!("serialize send body: {e}"))
                })?),
            )
            .await?;
        if !ack.ok {
            return Err(HandoffError::Backend {
                status: 200,
                message: "backend did not acknowledge send".into(),
            });
        }
        Ok(())
    }
}
