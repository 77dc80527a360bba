// SPDX-FileCopyrightText: 2026 Kitfn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Header lookup and value coercion helpers.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// Reads a header case-insensitively, falling back to `default` when the
/// header is absent or null.
///
/// Non-string header values (numbers, booleans) are returned in their JSON
/// text form.
pub fn header_value(headers: &Map<String, Value>, name: &str, default: &str) -> String {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .and_then(|(_, value)| scalar_to_string(value))
        .unwrap_or_else(|| default.to_string())
}

/// String form of a scalar JSON value. `None` for null, arrays and objects.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Collects the scalar entries of a JSON object into a string map.
///
/// Anything that is not an object yields an empty map; null, array and
/// object members are skipped.
pub fn string_map(value: &Value) -> BTreeMap<String, String> {
    let Some(object) = value.as_object() else {
        return BTreeMap::new();
    };
    object
        .iter()
        .filter_map(|(key, value)| scalar_to_string(value).map(|v| (key.clone(), v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn headers(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn header_lookup_ignores_case() {
        let h = headers(json!({"X-Kit-Domain": "acme"}));
        assert_eq!(header_value(&h, "x-kit-domain", ""), "acme");
    }

    #[test]
    fn header_lookup_falls_back_to_default() {
        let h = headers(json!({"x-kit-domain": null}));
        assert_eq!(header_value(&h, "x-kit-domain", "none"), "none");
        assert_eq!(header_value(&h, "x-kit-function-id", "0"), "0");
    }

    #[test]
    fn numeric_header_is_stringified() {
        let h = headers(json!({"x-kit-function-id": 42}));
        assert_eq!(header_value(&h, "x-kit-function-id", "0"), "42");
    }

    #[test]
    fn string_map_keeps_scalars_only() {
        let map = string_map(&json!({
            "a": "x",
            "b": 2,
            "c": true,
            "d": null,
            "e": {"nested": 1}
        }));
        assert_eq!(map.len(), 3);
        assert_eq!(map["b"], "2");
        assert_eq!(map["c"], "true");
        assert!(string_map(&json!([1, 2])).is_empty());
    }
}
