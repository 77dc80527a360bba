// SPDX-FileCopyrightText: 2026 Kitfn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Raw inbound requests (`{"headers": .., "body": ..}`) for each event kind.

use serde_json::{Value, json};

pub const DOMAIN: &str = "acme";
pub const FUNCTION_ID: &str = "17";
pub const CONVERSATION_UUID: &str = "5d3b4c2a-conv";

fn headers(event_type: &str) -> Value {
    json!({
        "x-kit-event-type": event_type,
        "x-kit-access-token": "fixture-token",
        "x-kit-api-url": "kitapi.test",
        "x-kit-domain": DOMAIN,
        "x-kit-function-id": FUNCTION_ID,
        "x-kit-session-access-url": "https://session.test/abc"
    })
}

/// An `in_call_function` request with call data, variables, skills and SIP
/// headers.
pub fn call_request() -> Value {
    json!({
        "headers": headers("in_call_function"),
        "body": {
            "CALL": {
                "id": 901,
                "result_code": 0,
                "attempt_num": 1,
                "session_id": "sess-77",
                "callerid": "15550001",
                "destination": "15550002",
                "display_name": "Alice",
                "phone_a": "15550001",
                "phone_b": "15550002",
                "record_url": "https://records.test/901.mp3"
            },
            "VARIABLES": {"lang": "en", "attempt": 2},
            "SKILLS": [{"skill_name": "english", "level": 3}],
            "HEADERS": {"X-Custom": "yes"}
        }
    })
}

/// An `incoming_message` request in conversation [`CONVERSATION_UUID`].
pub fn message_request() -> Value {
    json!({
        "headers": headers("incoming_message"),
        "body": {
            "text": "I need help with my bill",
            "type": "text",
            "sender": {"is_bot": false},
            "conversation": {
                "id": 55,
                "uuid": CONVERSATION_UUID,
                "client_id": "client-9",
                "custom_data": {
                    "request_data": {"variables": {"customer_tier": "gold"}},
                    "client_data": {"client_display_name": "Bob"}
                },
                "current_status": "active",
                "channel": {"channel_type": "telegram"}
            },
            "payload": [{"type": "properties", "message_type": "text"}],
            "customer": {"id": 3, "customer_display_name": "Bob"}
        }
    })
}

/// A plain `webhook` request carrying `body`.
pub fn webhook_request(body: Value) -> Value {
    json!({
        "headers": headers("webhook"),
        "body": body
    })
}
