// SPDX-FileCopyrightText: 2026 Gazette Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./gazette.toml` > `~/.config/gazette/gazette.toml` > `/etc/gazette/gazette.toml`
//! with environment variable overrides via `GAZETTE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::GazetteConfig;

/// Sections whose env vars map `GAZETTE_<SECTION>_<KEY>` to `<section>.<key>`.
const SECTIONS: &[&str] = &["server", "runtime", "jobs", "pipeline", "email"];

/// The system-wide and per-user config files, lowest precedence first.
pub(crate) fn config_file_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/gazette/gazette.toml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("gazette/gazette.toml"));
    }
    paths.push(PathBuf::from("gazette.toml"));
    paths
}

/// Build the Figment used for config loading.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/gazette/gazette.toml`
/// 3. `~/.config/gazette/gazette.toml`
/// 4. `./gazette.toml`
/// 5. `GAZETTE_*` environment variables
pub fn build_figment() -> Figment {
    let figment = config_file_paths()
        .into_iter()
        .fold(Figment::new().merge(Serialized::defaults(GazetteConfig::default())), |f, path| {
            f.merge(Toml::file(path))
        });
    figment.merge(env_provider())
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
pub fn load_config() -> Result<GazetteConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<GazetteConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(GazetteConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<GazetteConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(GazetteConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Environment provider mapping the first underscore after a known section to a dot.
///
/// `GAZETTE_EMAIL_SUBJECT_PREFIX` becomes `email.subject_prefix`, not
/// `email.subject.prefix`.
fn env_provider() -> Env {
    Env::prefixed("GAZETTE_").map(|key| {
        let key_str = key.as_str();
        SECTIONS
            .iter()
            .find_map(|section| {
                key_str
                    .strip_prefix(section)
                    .and_then(|rest| rest.strip_prefix('_'))
                    .map(|rest| format!("{section}.{rest}"))
            })
            .unwrap_or_else(|| key_str.to_string())
            .into()
    })
}
