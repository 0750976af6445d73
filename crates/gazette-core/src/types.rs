// SPDX-FileCopyrightText: 2026 Gazette Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Gazette service.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier for a newsletter-generation run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a fresh, never-reused job id.
    pub fn generate() -> Self {
        JobId(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        JobId(s.to_string())
    }
}

/// Identifier (slug) of one newsletter section.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicId(pub String);

impl TopicId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TopicId {
    fn from(s: &str) -> Self {
        TopicId(s.to_string())
    }
}

/// Lifecycle state of one topic within a job.
///
/// `queued -> running -> {done, failed}`; `missing` is the consolidation
/// verdict for a topic whose artifact could not be found.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TopicState {
    Queued,
    #[serde(alias = "active")]
    #[strum(to_string = "running", serialize = "active")]
    Running,
    Done,
    Failed,
    Missing,
}

impl TopicState {
    /// Terminal states never transition again through status reports.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TopicState::Done | TopicState::Failed | TopicState::Missing
        )
    }
}

/// A topic in the configured catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicDefinition {
    pub slug: TopicId,
    pub label: String,
    pub icon: String,
}

/// A status transition posted by the pipeline for one topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicEvent {
    pub topic: TopicId,
    pub state: TopicState,
    pub detail: String,
}

/// What a successful pipeline run hands back to the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutput {
    /// Location of the consolidated document.
    pub artifact_path: PathBuf,
    /// Per-topic documents that were produced.
    pub topic_outputs: BTreeMap<TopicId, PathBuf>,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the type of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Pipeline,
    Mailer,
    Observability,
}
