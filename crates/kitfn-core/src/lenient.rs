// SPDX-FileCopyrightText: 2026 Kitfn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Field deserializers that never fail on a present value.
//!
//! Platform bodies are loosely typed: ids arrive as numbers or strings and
//! optional text may be `null`. These helpers are used with
//! `#[serde(deserialize_with = ..)]` so one odd field degrades to its
//! default instead of rejecting the whole record.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::util::scalar_to_string;

/// Integer form of a number or numeric string. Fractional numbers are
/// rejected.
pub fn int_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// `T`, or `T::default()` when the value does not fit.
pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// An optional integer; numeric strings are accepted.
pub fn opt_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(int_value(&value))
}

/// An optional string; numbers and booleans are kept in text form.
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_to_string(&value))
}

/// A string, empty for `null` or non-scalar values.
pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    opt_string(deserializer).map(Option::unwrap_or_default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Loose {
        #[serde(deserialize_with = "opt_int")]
        id: Option<i64>,
        #[serde(deserialize_with = "string")]
        text: String,
        #[serde(deserialize_with = "or_default")]
        tags: Vec<String>,
    }

    #[test]
    fn int_value_accepts_numeric_text() {
        assert_eq!(int_value(&json!(7)), Some(7));
        assert_eq!(int_value(&json!(7.0)), Some(7));
        assert_eq!(int_value(&json!(" 901 ")), Some(901));
        assert_eq!(int_value(&json!(1.5)), None);
        assert_eq!(int_value(&json!("abc")), None);
        assert_eq!(int_value(&json!(null)), None);
    }

    #[test]
    fn odd_fields_fall_back_individually() {
        let loose: Loose = serde_json::from_value(json!({
            "id": "42",
            "text": null,
            "tags": "not a list"
        }))
        .unwrap();
        assert_eq!(loose.id, Some(42));
        assert_eq!(loose.text, "");
        assert!(loose.tags.is_empty());

        let loose: Loose = serde_json::from_value(json!({"text": 5})).unwrap();
        assert_eq!(loose.text, "5");
        assert_eq!(loose.id, None);
    }
}
