// SPDX-FileCopyrightText: 2026 Gazette Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Gazette configuration system.

use gazette_config::diagnostic::ConfigError;
use gazette_config::model::GazetteConfig;
use gazette_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with every section deserializes.
#[test]
fn valid_toml_deserializes_into_gazette_config() {
    let toml = r#"
[server]
host = "0.0.0.0"
port = 8080
bearer_token = "s3cret"
log_level = "debug"

[runtime]
cache_path = "/tmp/runtimes.json"
max_samples = 3
floor_percent = 10
cap_percent = 95
ramp_secs = 60.0

[jobs]
retention_secs = 86400
reap_interval_secs = 60

[pipeline]
command = ["crew", "{slug}"]
output_dir = "/tmp/out"

[email]
smtp_host = "smtp.example.com"
smtp_port = 2525
username = "bot@example.com"
password = "app-password"
subject_prefix = "Weekly Digest"

[email.groups]
ops = ["ops@example.com"]

[[topics]]
slug = "security"
label = "Security"
icon = "S"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.server.bearer_token.as_deref(), Some("s3cret"));
    assert_eq!(config.runtime.max_samples, 3);
    assert_eq!(config.runtime.floor_percent, 10);
    assert_eq!(config.runtime.cap_percent, 95);
    assert_eq!(config.runtime.ramp_secs, 60.0);
    assert_eq!(config.jobs.retention_secs, Some(86400));
    assert_eq!(config.pipeline.command, vec!["crew", "{slug}"]);
    assert_eq!(config.email.smtp_port, 2525);
    assert_eq!(config.email.groups["ops"], vec!["ops@example.com"]);
    // Default groups survive alongside configured ones.
    assert!(config.email.groups.contains_key("all"));
    assert_eq!(config.topics.len(), 1);
    assert_eq!(config.topics[0].slug, "security");
}

#[test]
fn empty_toml_yields_defaults() {
    let config = load_config_from_str("").unwrap();
    let defaults = GazetteConfig::default();
    assert_eq!(config.server.port, defaults.server.port);
    assert_eq!(config.runtime.max_samples, 5);
    assert_eq!(config.runtime.ramp_secs, 120.0);
    assert_eq!(config.topics.len(), 5);
    assert_eq!(config.topics[0].slug, "ai_at_work");
    assert!(config.jobs.retention_secs.is_none());
}

#[test]
fn unknown_field_produces_suggestion() {
    let toml = r#"
[email]
subject_prefx = "Digest"
"#;
    let errors = load_and_validate_str(toml).unwrap_err();
    let suggestion = errors.iter().find_map(|e| match e {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } if key == "subject_prefx" => suggestion.clone(),
        _ => None,
    });
    assert_eq!(suggestion.as_deref(), Some("subject_prefix"));
}

#[test]
fn unknown_section_is_rejected() {
    let toml = r#"
[telegram]
bot_token = "abc"
"#;
    assert!(load_config_from_str(toml).is_err());
}

#[test]
fn wrong_type_reports_invalid_type() {
    let toml = r#"
[server]
port = "eighty"
"#;
    let errors = load_and_validate_str(toml).unwrap_err();
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("port"))),
        "expected InvalidType for server.port, got {errors:?}"
    );
}

#[test]
fn validation_runs_after_parse() {
    let toml = r#"
[runtime]
floor_percent = 90
cap_percent = 90
"#;
    let errors = load_and_validate_str(toml).unwrap_err();
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("floor_percent"))));
}

#[test]
fn topic_missing_label_reports_missing_key() {
    let toml = r#"
[[topics]]
slug = "security"
"#;
    let errors = load_and_validate_str(toml).unwrap_err();
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::MissingKey { key } if key == "label")));
}
