// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Handoff inbox coordinator.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use serde::{Deserialize, Serialize};

use handoff_core::Channel;

/// Top-level Handoff configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values; `operator.id` must be set before a session can be spawned.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HandoffConfig {
    /// Operator identity.
    #[serde(default)]
    pub operator: OperatorConfig,

    /// REST backend settings.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Realtime connection settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,

    /// Inbox behavior settings.
    #[serde(default)]
    pub inbox: InboxConfig,
}

/// Operator identity configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OperatorConfig {
    /// Operator identity used for the takeover lock. Required for sessions.
    #[serde(default)]
    pub id: Option<String>,

    /// Display name shown in the dashboard.
    #[serde(default)]
    pub name: Option<String>,
}

/// REST backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    /// API root, without a trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token for the `Authorization` header.
    #[serde(default)]
    pub api_token: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Realtime connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RealtimeConfig {
    /// WebSocket endpoint for the realtime channel.
    #[serde(default = "default_realtime_url")]
    pub url: String,

    /// Connect attempts per disconnection episode before giving up.
    #[serde(default = "default_reconnect_attempts")]
    pub reconnect_attempts: u32,

    /// Fixed backoff between attempts, in milliseconds.
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            url: default_realtime_url(),
            reconnect_attempts: default_reconnect_attempts(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
        }
    }
}

fn default_realtime_url() -> String {
    "ws://localhost:8080/rt".to_string()
}

fn default_reconnect_attempts() -> u32 {
    5
}

fn default_reconnect_delay_ms() -> u64 {
    2000
}

/// Inbox behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InboxConfig {
    /// Default channel scope for sessions.
    #[serde(default = "default_channel")]
    pub channel: Channel,

    /// History page size for cold open and backward pagination.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for InboxConfig {
    fn default() -> Self {
        Self {
            channel: default_channel(),
            page_size: default_page_size(),
            log_level: default_log_level(),
        }
    }
}

fn default_channel() -> Channel {
    Channel::WhatsApp
}

fn default_page_size() -> u32 {
    50
}

fn default_log_level() -> String {
    "info".to_string()
}
