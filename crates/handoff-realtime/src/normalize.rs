// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Payload shape normalization.
//!
//! Event payloads vary across backend versions: a pairing code may arrive
//! as a bare string or as an object carrying the value under one of
//! several field names. Normalization probes an explicit ordered chain of
//! extractors and returns the first non-empty match, falling back to an
//! empty value. Malformed payloads are reported as `None` and dropped by
//! the router; nothing here throws.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use handoff_core::{Direction, Message, Thread};

/// One step in a fallback chain: extracts a candidate value from a payload.
type Extractor<'a> = &'a dyn Fn(&Value) -> Option<String>;

/// Runs an ordered extractor chain and returns the first non-empty match,
/// or an empty string when no extractor produces one.
fn first_non_empty(payload: &Value, chain: &[Extractor<'_>]) -> String {
    for extract in chain {
        if let Some(candidate) = extract(payload)
            && !candidate.is_empty()
        {
            return candidate;
        }
    }
    String::new()
}

fn bare_string(payload: &Value) -> Option<String> {
    payload.as_str().map(str::to_owned)
}

fn field(name: &'static str) -> impl Fn(&Value) -> Option<String> {
    move |payload: &Value| payload.get(name).and_then(Value::as_str).map(str::to_owned)
}

/// Normalizes a pairing-code payload.
///
/// Probes, in priority order: the bare string form, then the `code`,
/// `pairingCode`, `qr`, `qrCode`, `value`, and `data` fields.
pub fn pairing_code(payload: &Value) -> String {
    first_non_empty(
        payload,
        &[
            &bare_string,
            &field("code"),
            &field("pairingCode"),
            &field("qr"),
            &field("qrCode"),
            &field("value"),
            &field("data"),
        ],
    )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageEventWire {
    contact_id: String,
    message: Message,
    #[serde(default)]
    direction: Option<Direction>,
}

/// Parses an `inbox-message` payload. The direction falls back to the one
/// implied by the message role when the event omits it.
pub fn message_event(payload: &Value) -> Option<(String, Message, Direction)> {
    match serde_json::from_value::<MessageEventWire>(payload.clone()) {
        Ok(wire) => {
            let direction = wire.direction.unwrap_or_else(|| wire.message.direction());
            Some((wire.contact_id, wire.message, direction))
        }
        Err(e) => {
            debug!(error = %e, "malformed inbox-message payload dropped");
            None
        }
    }
}

/// Parses an `inbox-thread-updated` payload. The payload may carry the
/// thread directly or nested under a `thread` field.
pub fn thread_update(payload: &Value) -> Option<Thread> {
    let candidate = payload.get("thread").unwrap_or(payload);
    match serde_json::from_value::<Thread>(candidate.clone()) {
        Ok(thread) => Some(thread),
        Err(e) => {
            debug!(error = %e, "malformed thread-updated payload dropped");
            None
        }
    }
}

/// Extracts a human-readable message from a `connect_error` payload.
pub fn error_message(payload: &Value) -> String {
    first_non_empty(payload, &[&bare_string, &field("message"), &field("error")])
}

#[cfg(test)]
mod tests {
    use super::*;
    use handoff_core::MessageRole;
    use serde_json::json;

    #[test]
    fn pairing_code_accepts_bare_string() {
        assert_eq!(pairing_code(&json!("ABCD-1234")), "ABCD-1234");
    }

    #[test]
    fn pairing_code_probes_fields_in_priority_order() {
        assert_eq!(pairing_code(&json!({"code": "X1"})), "X1");
        assert_eq!(pairing_code(&json!({"pairingCode": "X2"})), "X2");
        assert_eq!(pairing_code(&json!({"qr": "X3"})), "X3");
        assert_eq!(pairing_code(&json!({"qrCode": "X4"})), "X4");
        assert_eq!(pairing_code(&json!({"value": "X5"})), "X5");
        assert_eq!(pairing_code(&json!({"data": "X6"})), "X6");
        // Priority: an earlier field wins even when later ones are present.
        assert_eq!(
            pairing_code(&json!({"data": "late", "code": "early"})),
            "early"
        );
    }

    #[test]
    fn pairing_code_skips_empty_candidates() {
        assert_eq!(pairing_code(&json!({"code": "", "qr": "fallback"})), "fallback");
    }

    #[test]
    fn pairing_code_falls_back_to_empty() {
        assert_eq!(pairing_code(&json!({"unrelated": 42})), "");
        assert_eq!(pairing_code(&json!(null)), "");
        assert_eq!(pairing_code(&json!(["array"])), "");
    }

    #[test]
    fn message_event_parses_and_defaults_direction() {
        let payload = json!({
            "contactId": "c1",
            "message": {"role": "user", "content": "hi", "timestampMs": 7}
        });
        let (contact, msg, direction) = message_event(&payload).unwrap();
        assert_eq!(contact, "c1");
        assert_eq!(msg.role, MessageRole::User);
        assert_eq!(direction, Direction::Inbound);
    }

    #[test]
    fn message_event_honors_explicit_direction() {
        let payload = json!({
            "contactId": "c1",
            "direction": "outbound",
            "message": {"role": "user", "content": "echo", "timestampMs": 7}
        });
        let (_, _, direction) = message_event(&payload).unwrap();
        assert_eq!(direction, Direction::Outbound);
    }

    #[test]
    fn malformed_message_event_is_dropped_not_thrown() {
        assert!(message_event(&json!({"contactId": 5})).is_none());
        assert!(message_event(&json!("garbage")).is_none());
    }

    #[test]
    fn thread_update_accepts_flat_and_nested_shapes() {
        let flat = json!({
            "agentId": "a", "channel": "whatsapp", "contactId": "c",
            "lastMessageAtMs": 9, "lastDirection": "inbound"
        });
        assert!(thread_update(&flat).is_some());

        let nested = json!({"thread": flat});
        assert_eq!(thread_update(&nested).unwrap().key.contact_id, "c");
    }

    #[test]
    fn error_message_normalizes_both_shapes() {
        assert_eq!(error_message(&json!("boom")), "boom");
        assert_eq!(error_message(&json!({"message": "down"})), "down");
        assert_eq!(error_message(&json!(12)), "");
    }
}
