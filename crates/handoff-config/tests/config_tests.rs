// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Handoff configuration system.

use std::io::Write;

use handoff_config::{load_config_from_path, load_config_from_str};
use handoff_core::Channel;

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_handoff_config() {
    let toml = r#"
[operator]
id = "op-7"
name = "Dana"

[backend]
base_url = "https://api.example.com"
api_token = "secret"
timeout_secs = 10

[realtime]
url = "wss://rt.example.com/socket"
reconnect_attempts = 3
reconnect_delay_ms = 500

[inbox]
channel = "instagram"
page_size = 25
log_level = "debug"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.operator.id.as_deref(), Some("op-7"));
    assert_eq!(config.operator.name.as_deref(), Some("Dana"));
    assert_eq!(config.backend.base_url, "https://api.example.com");
    assert_eq!(config.backend.api_token.as_deref(), Some("secret"));
    assert_eq!(config.backend.timeout_secs, 10);
    assert_eq!(config.realtime.url, "wss://rt.example.com/socket");
    assert_eq!(config.realtime.reconnect_attempts, 3);
    assert_eq!(config.realtime.reconnect_delay_ms, 500);
    assert_eq!(config.inbox.channel, Channel::Instagram);
    assert_eq!(config.inbox.page_size, 25);
    assert_eq!(config.inbox.log_level, "debug");
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");
    assert!(config.operator.id.is_none());
    assert_eq!(config.backend.base_url, "http://localhost:8080");
    assert_eq!(config.realtime.reconnect_attempts, 5);
    assert_eq!(config.inbox.page_size, 50);
    assert_eq!(config.inbox.channel, Channel::WhatsApp);
}

/// Unknown fields are rejected at load time.
#[test]
fn unknown_field_produces_error() {
    let toml = r#"
[backend]
base_ulr = "https://typo.example.com"
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("base_ulr"),
        "error should mention unknown field or the bad key, got: {err_str}"
    );
}

/// An invalid channel name is rejected.
#[test]
fn invalid_channel_is_rejected() {
    let toml = r#"
[inbox]
channel = "telegraph"
"#;
    assert!(load_config_from_str(toml).is_err());
}

/// Loading from an explicit path picks up file contents.
#[test]
fn load_from_path_reads_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(
        file,
        "[operator]\nid = \"op-file\"\n\n[inbox]\npage_size = 5"
    )
    .expect("write config");

    let config = load_config_from_path(file.path()).expect("file should load");
    assert_eq!(config.operator.id.as_deref(), Some("op-file"));
    assert_eq!(config.inbox.page_size, 5);
}
