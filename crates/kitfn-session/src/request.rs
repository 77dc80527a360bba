// SPDX-FileCopyrightText: 2026 Kitfn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The raw request handed to a function.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Headers and body of one invocation, before any interpretation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundRequest {
    #[serde(default)]
    pub headers: Map<String, Value>,
    #[serde(default = "empty_body")]
    pub body: Value,
}

fn empty_body() -> Value {
    Value::Object(Map::new())
}

impl InboundRequest {
    pub fn new(headers: Map<String, Value>, body: Value) -> Self {
        Self { headers, body }
    }

    /// Reads `{"headers": {..}, "body": ..}`, substituting empty headers and
    /// an empty body for anything missing or mistyped.
    pub fn from_value(value: &Value) -> Self {
        Self {
            headers: value
                .get("headers")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default(),
            body: value
                .get("body")
                .filter(|body| !body.is_null())
                .cloned()
                .unwrap_or_else(empty_body),
        }
    }
}

impl Default for InboundRequest {
    fn default() -> Self {
        Self {
            headers: Map::new(),
            body: empty_body(),
        }
    }
}
