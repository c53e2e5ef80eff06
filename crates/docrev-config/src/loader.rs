// SPDX-FileCopyrightText: 2026 Docrev Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./docrev.toml` > `~/.config/docrev/docrev.toml` > `/etc/docrev/docrev.toml`
//! with environment variable overrides via `DOCREV_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::DocrevConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/docrev/docrev.toml` (system-wide)
/// 3. `~/.config/docrev/docrev.toml` (user XDG config)
/// 4. `./docrev.toml` (local directory)
/// 5. `DOCREV_*` environment variables
pub fn load_config() -> Result<DocrevConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DocrevConfig::default()))
        .merge(Toml::file("/etc/docrev/docrev.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("docrev/docrev.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("docrev.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<DocrevConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DocrevConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<DocrevConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DocrevConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names. `DOCREV_BACKEND_BASE_URL` must map to
/// `backend.base_url`, not `backend.base.url`.
fn env_provider() -> Env {
    Env::prefixed("DOCREV_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: DOCREV_BACKEND_BASE_URL -> "backend_base_url"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("backend_", "backend.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("log_", "log.", 1);
        mapped.into()
    })
}
