// SPDX-FileCopyrightText: 2026 Gazette Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Gazette service.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Top-level Gazette configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GazetteConfig {
    /// HTTP listener and logging.
    #[serde(default)]
    pub server: ServerConfig,

    /// Duration cache and progress estimation.
    #[serde(default)]
    pub runtime: RuntimeConfig,

    /// Job registry retention.
    #[serde(default)]
    pub jobs: JobsConfig,

    /// External generation pipeline.
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Mail delivery and recipient groups.
    #[serde(default)]
    pub email: EmailConfig,

    /// Newsletter sections offered to users, in display order.
    #[serde(default = "default_topics")]
    pub topics: Vec<TopicConfig>,
}

impl Default for GazetteConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            runtime: RuntimeConfig::default(),
            jobs: JobsConfig::default(),
            pipeline: PipelineConfig::default(),
            email: EmailConfig::default(),
            topics: default_topics(),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bearer token required on `/v1` routes. `None` leaves them open.
    #[serde(default)]
    pub bearer_token: Option<String>,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            bearer_token: None,
            log_level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Progress estimation and the persisted duration-sample cache.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RuntimeConfig {
    /// JSON file holding per-topic completion durations.
    #[serde(default = "default_cache_path")]
    pub cache_path: String,

    /// Samples kept per topic; the oldest is evicted on overflow.
    #[serde(default = "default_max_samples")]
    pub max_samples: usize,

    /// Progress shown for a topic the moment it starts running.
    #[serde(default = "default_floor_percent")]
    pub floor_percent: u8,

    /// Highest progress a running topic can show.
    #[serde(default = "default_cap_percent")]
    pub cap_percent: u8,

    /// Expected topic duration in seconds when no history exists.
    #[serde(default = "default_ramp_secs")]
    pub ramp_secs: f64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            cache_path: default_cache_path(),
            max_samples: default_max_samples(),
            floor_percent: default_floor_percent(),
            cap_percent: default_cap_percent(),
            ramp_secs: default_ramp_secs(),
        }
    }
}

fn default_cache_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("gazette").join("topic_runtimes.json"))
        .unwrap_or_else(|| std::path::PathBuf::from("instance/memory/topic_runtimes.json"))
        .display()
        .to_string()
}

fn default_max_samples() -> usize {
    5
}

fn default_floor_percent() -> u8 {
    5
}

fn default_cap_percent() -> u8 {
    90
}

fn default_ramp_secs() -> f64 {
    120.0
}

/// Job registry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct JobsConfig {
    /// Finished jobs older than this are evicted. `None` keeps jobs until restart.
    #[serde(default)]
    pub retention_secs: Option<u64>,

    /// How often the reaper runs when retention is enabled.
    #[serde(default = "default_reap_interval_secs")]
    pub reap_interval_secs: u64,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            retention_secs: None,
            reap_interval_secs: default_reap_interval_secs(),
        }
    }
}

fn default_reap_interval_secs() -> u64 {
    300
}

/// External generation pipeline configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Argv run once per topic. `{slug}`, `{label}` and `{output}` are substituted.
    #[serde(default = "default_pipeline_command")]
    pub command: Vec<String>,

    /// Directory receiving per-topic documents and the consolidated newsletter.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            command: default_pipeline_command(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_pipeline_command() -> Vec<String> {
    vec![
        "research-crew".to_string(),
        "--topic".to_string(),
        "{slug}".to_string(),
        "--output".to_string(),
        "{output}".to_string(),
    ]
}

fn default_output_dir() -> String {
    "outputs".to_string()
}

/// Mail delivery configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EmailConfig {
    /// SMTP relay host (STARTTLS).
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,

    /// SMTP relay port.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// SMTP username. Also used as the sender when `from` is unset.
    #[serde(default)]
    pub username: Option<String>,

    /// SMTP password or app password.
    #[serde(default)]
    pub password: Option<String>,

    /// Sender address.
    #[serde(default)]
    pub from: Option<String>,

    /// Subject line prefix; the month name is appended.
    #[serde(default = "default_subject_prefix")]
    pub subject_prefix: String,

    /// Named recipient groups.
    #[serde(default = "default_groups")]
    pub groups: BTreeMap<String, Vec<String>>,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            username: None,
            password: None,
            from: None,
            subject_prefix: default_subject_prefix(),
            groups: default_groups(),
        }
    }
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_subject_prefix() -> String {
    "Tech Newsletter".to_string()
}

fn default_groups() -> BTreeMap<String, Vec<String>> {
    ["all", "ops", "eng"]
        .into_iter()
        .map(|g| (g.to_string(), Vec::new()))
        .collect()
}

/// One newsletter section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TopicConfig {
    /// Canonical slug (underscores, no hyphens).
    pub slug: String,

    /// Display label, also passed to the pipeline.
    pub label: String,

    /// Short icon shown next to the label.
    #[serde(default)]
    pub icon: String,
}

fn default_topics() -> Vec<TopicConfig> {
    [
        ("ai_at_work", "AI at Work", "\u{1F916}"),
        ("it_hacks", "IT Hacks", "\u{1F527}"),
        ("o365_updates", "O365 Updates", "\u{2601}"),
        ("tech_discovery", "Tech Discovery", "\u{1F50D}"),
        ("tech_trends", "Tech Trends", "\u{1F680}"),
    ]
    .into_iter()
    .map(|(slug, label, icon)| TopicConfig {
        slug: slug.to_string(),
        label: label.to_string(),
        icon: icon.to_string(),
    })
    .collect()
}
