// SPDX-FileCopyrightText: 2026 Kitfn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for the kitfn session adapter.
//!
//! TOML files and `KITFN_*` environment variables are merged with figment,
//! unknown keys are rejected, and failures are rendered as miette
//! diagnostics with typo suggestions.

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str, render_toml};
pub use model::KitConfig;

/// Load configuration from the standard hierarchy and validate it.
pub fn load_and_validate() -> Result<KitConfig, Vec<ConfigError>> {
    let config = loader::load_config().map_err(diagnostic::figment_to_config_errors)?;
    validation::validate_config(&config)?;
    Ok(config)
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<KitConfig, Vec<ConfigError>> {
    let config =
        loader::load_config_from_str(toml_content).map_err(diagnostic::figment_to_config_errors)?;
    validation::validate_config(&config)?;
    Ok(config)
}

/// Load configuration from one file (plus env overrides) and validate it.
pub fn load_and_validate_path(path: &std::path::Path) -> Result<KitConfig, Vec<ConfigError>> {
    let config =
        loader::load_config_from_path(path).map_err(diagnostic::figment_to_config_errors)?;
    validation::validate_config(&config)?;
    Ok(config)
}
