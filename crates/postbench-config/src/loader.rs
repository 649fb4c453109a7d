// SPDX-FileCopyrightText: 2026 Postbench Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./postbench.toml` > `~/.config/postbench/postbench.toml`
//! > `/etc/postbench/postbench.toml` with environment variable overrides via
//! the `POSTBENCH_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::PostbenchConfig;

pub(crate) const LOCAL_CONFIG: &str = "postbench.toml";
pub(crate) const SYSTEM_CONFIG: &str = "/etc/postbench/postbench.toml";
pub(crate) const ENV_PREFIX: &str = "POSTBENCH_";

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/postbench/postbench.toml`
/// 3. `~/.config/postbench/postbench.toml`
/// 4. `./postbench.toml`
/// 5. `POSTBENCH_*` environment variables
pub fn load_config() -> Result<PostbenchConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<PostbenchConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PostbenchConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from an explicit file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<PostbenchConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PostbenchConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for hierarchy loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(PostbenchConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

pub(crate) fn user_config_path() -> Option<std::path::PathBuf> {
    dirs::config_dir().map(|d| d.join("postbench").join(LOCAL_CONFIG))
}

/// Environment provider mapping `POSTBENCH_SECTION_KEY` to `section.key`.
///
/// Uses `Env::map()` rather than `Env::split("_")` so that keys containing
/// underscores survive: `POSTBENCH_STORAGE_DATABASE_PATH` must map to
/// `storage.database_path`, not `storage.database.path`.
fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX).map(|key| {
        // Keys keep the variable's original case.
        let mapped = key
            .as_str()
            .to_ascii_lowercase()
            .replacen("server_", "server.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("writer_", "writer.", 1)
            .replacen("log_", "log.", 1);
        mapped.into()
    })
}
