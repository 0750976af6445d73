// SPDX-FileCopyrightText: 2026 Gazette Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints serde attributes cannot express: usable bind
//! addresses, sane progress bounds, and a well-formed topic catalog.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::GazetteConfig;

/// Validate a deserialized configuration.
///
/// Collects every failure rather than stopping at the first one.
pub fn validate_config(config: &GazetteConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let host = config.server.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::validation("server.host must not be empty"));
    } else if host.parse::<std::net::IpAddr>().is_err()
        && !host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        errors.push(ConfigError::validation(format!(
            "server.host `{host}` is not a valid IP address or hostname"
        )));
    }

    if config.server.bearer_token.as_deref().is_some_and(|t| t.trim().is_empty()) {
        errors.push(ConfigError::validation(
            "server.bearer_token must not be blank; remove it to disable auth",
        ));
    }

    let runtime = &config.runtime;
    if runtime.cache_path.trim().is_empty() {
        errors.push(ConfigError::validation("runtime.cache_path must not be empty"));
    }
    if runtime.max_samples == 0 {
        errors.push(ConfigError::validation("runtime.max_samples must be at least 1"));
    }
    if runtime.cap_percent > 100 {
        errors.push(ConfigError::validation(format!(
            "runtime.cap_percent must be at most 100, got {}",
            runtime.cap_percent
        )));
    }
    if runtime.floor_percent >= runtime.cap_percent {
        errors.push(ConfigError::validation(format!(
            "runtime.floor_percent ({}) must be below runtime.cap_percent ({})",
            runtime.floor_percent, runtime.cap_percent
        )));
    }
    if !(runtime.ramp_secs.is_finite() && runtime.ramp_secs > 0.0) {
        errors.push(ConfigError::validation(format!(
            "runtime.ramp_secs must be positive, got {}",
            runtime.ramp_secs
        )));
    }

    if config.jobs.retention_secs.is_some() && config.jobs.reap_interval_secs == 0 {
        errors.push(ConfigError::validation(
            "jobs.reap_interval_secs must be at least 1 when jobs.retention_secs is set",
        ));
    }

    if config.pipeline.command.is_empty() {
        errors.push(ConfigError::validation("pipeline.command must not be empty"));
    }
    if config.pipeline.output_dir.trim().is_empty() {
        errors.push(ConfigError::validation("pipeline.output_dir must not be empty"));
    }

    if config.email.subject_prefix.trim().is_empty() {
        errors.push(ConfigError::validation("email.subject_prefix must not be empty"));
    }
    for (group, addresses) in &config.email.groups {
        if let Some(bad) = addresses.iter().find(|a| !a.contains('@')) {
            errors.push(ConfigError::validation(format!(
                "email.groups.{group} contains `{bad}`, which is not an email address"
            )));
        }
    }

    if config.topics.is_empty() {
        errors.push(ConfigError::validation("at least one [[topics]] entry is required"));
    }
    let mut seen = HashSet::new();
    for (i, topic) in config.topics.iter().enumerate() {
        if topic.slug.trim().is_empty() {
            errors.push(ConfigError::validation(format!("topics[{i}].slug must not be empty")));
        } else if topic.slug.contains('-') {
            errors.push(ConfigError::validation(format!(
                "topics[{i}].slug `{}` must use underscores, not hyphens",
                topic.slug
            )));
        }
        if !seen.insert(topic.slug.as_str()) {
            errors.push(ConfigError::validation(format!(
                "duplicate topic slug `{}` in [[topics]]",
                topic.slug
            )));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
