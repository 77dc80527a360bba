// SPDX-FileCopyrightText: 2026 Kitfn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so that a typo in
//! `kitfn.toml` is reported instead of silently ignored.

use serde::{Deserialize, Serialize};

/// Top-level kitfn configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KitConfig {
    /// Platform API client settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Scoped store settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Platform API client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Host used when the request carries no `x-kit-api-url` header.
    #[serde(default = "default_api_url")]
    pub default_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Talk plain `http` instead of `https` (local stubs and tests).
    #[serde(default)]
    pub test_mode: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            default_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
            test_mode: false,
        }
    }
}

fn default_api_url() -> String {
    "kitapi-eu.voximplant.com".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Scoped store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// TTL sent with every scope write. `-1` keeps the blob forever.
    #[serde(default = "default_ttl")]
    pub ttl: i64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { ttl: default_ttl() }
    }
}

fn default_ttl() -> i64 {
    -1
}

/// Log output configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
