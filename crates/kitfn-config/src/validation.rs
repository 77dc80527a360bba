// SPDX-FileCopyrightText: 2026 Kitfn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic checks that serde attributes cannot express.

use crate::diagnostic::ConfigError;
use crate::model::KitConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration, collecting every failure.
pub fn validate_config(config: &KitConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let url = config.api.default_url.trim();
    if url.is_empty() {
        errors.push(ConfigError::Validation {
            message: "api.default_url must not be empty".to_string(),
        });
    } else if url.contains("://") {
        errors.push(ConfigError::Validation {
            message: format!(
                "api.default_url `{url}` must be a host, the scheme comes from api.test_mode"
            ),
        });
    }

    if config.api.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "api.timeout_secs must be greater than zero".to_string(),
        });
    }

    let level = config.logging.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "logging.level `{}` is not one of {}",
                config.logging.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
