// SPDX-FileCopyrightText: 2026 Kitfn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment-based layered loading.
//!
//! Merge order, later wins: compiled defaults, `/etc/kitfn/kitfn.toml`,
//! `~/.config/kitfn/kitfn.toml`, `./kitfn.toml`, `KITFN_*` variables.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::diagnostic::ConfigError;
use crate::model::KitConfig;

/// Load configuration from the standard hierarchy with env var overrides.
pub fn load_config() -> Result<KitConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<KitConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KitConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from one file with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<KitConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KitConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The full layered figment, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(KitConfig::default()))
        .merge(Toml::file("/etc/kitfn/kitfn.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("kitfn/kitfn.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("kitfn.toml"))
        .merge(env_provider())
}

/// `KITFN_API_DEFAULT_URL` must become `api.default_url`, so the key is
/// lowercased and only the underscore after the section name is turned into
/// a dot. figment passes the key to `map` in its original case.
fn env_provider() -> Env {
    Env::prefixed("KITFN_").map(|key| section_key(key.as_str()).into())
}

fn section_key(raw: &str) -> String {
    let key = raw.to_ascii_lowercase();
    for section in ["api", "store", "logging"] {
        if let Some(field) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{field}");
        }
    }
    key
}

/// Serializes the effective configuration back to TOML.
pub fn render_toml(config: &KitConfig) -> Result<String, ConfigError> {
    toml::to_string_pretty(config).map_err(|e| ConfigError::Other(e.to_string()))
}
