// SPDX-FileCopyrightText: 2026 Gazette Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock generation pipeline for deterministic testing.
//!
//! `MockPipeline` implements `PipelineAdapter` by reporting the usual
//! `running -> done` sequence for each topic and writing a small consolidated
//! HTML file. Failures, panics, missing topics and step-by-step gating can be
//! configured for testing the worker and the status surface.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, Semaphore};

use gazette_core::traits::adapter::PluginAdapter;
use gazette_core::traits::pipeline::{PipelineAdapter, TopicReporter};
use gazette_core::types::{
    AdapterType, HealthStatus, PipelineOutput, TopicDefinition, TopicId, TopicState,
};
use gazette_core::GazetteError;

/// A scripted pipeline.
pub struct MockPipeline {
    output_dir: PathBuf,
    fail_with: Option<String>,
    panic_with: Option<String>,
    missing: Vec<TopicId>,
    gate: Option<Arc<Semaphore>>,
    runs: Arc<Mutex<Vec<Vec<TopicId>>>>,
    editions: Arc<Mutex<Vec<String>>>,
}

impl MockPipeline {
    /// A pipeline that succeeds, writing its artifact under `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            fail_with: None,
            panic_with: None,
            missing: Vec::new(),
            gate: None,
            runs: Arc::new(Mutex::new(Vec::new())),
            editions: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Fail after the first topic starts running.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.fail_with = Some(message.into());
        self
    }

    /// Panic after the first topic starts running.
    pub fn panicking(mut self, message: impl Into<String>) -> Self {
        self.panic_with = Some(message.into());
        self
    }

    /// Report `topic` as missing during consolidation.
    pub fn with_missing(mut self, topic: impl Into<TopicId>) -> Self {
        self.missing.push(topic.into());
        self
    }

    /// Hold each topic in `running` until [`MockPipeline::release`] is called.
    pub fn gated(mut self) -> Self {
        self.gate = Some(Arc::new(Semaphore::new(0)));
        self
    }

    /// Let one gated topic finish.
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    /// Let every remaining gated topic finish.
    pub fn release_all(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1024);
        }
    }

    /// Topics passed to each call of `run`, in call order.
    pub async fn runs(&self) -> Vec<Vec<TopicId>> {
        self.runs.lock().await.clone()
    }

    /// Edition passed to each call of `run`, in call order.
    pub async fn editions(&self) -> Vec<String> {
        self.editions.lock().await.clone()
    }

    /// Where a successful run writes its artifact.
    pub fn artifact_path(&self) -> PathBuf {
        self.output_dir.join("newsletter_email_test.html")
    }
}

#[async_trait]
impl PluginAdapter for MockPipeline {
    fn name(&self) -> &str {
        "mock-pipeline"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Pipeline
    }

    async fn health_check(&self) -> Result<HealthStatus, GazetteError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl PipelineAdapter for MockPipeline {
    async fn run(
        &self,
        edition: &str,
        topics: &[TopicDefinition],
        reporter: TopicReporter,
    ) -> Result<PipelineOutput, GazetteError> {
        self.editions.lock().await.push(edition.to_string());
        self.runs
            .lock()
            .await
            .push(topics.iter().map(|t| t.slug.clone()).collect());

        let mut topic_outputs = BTreeMap::new();
        let mut body = String::new();
        for topic in topics {
            reporter.report(&topic.slug, TopicState::Running, format!("Generating {}", topic.label));

            if let Some(message) = &self.panic_with {
                panic!("{message}");
            }

            if let Some(message) = &self.fail_with {
                return Err(GazetteError::Pipeline {
                    message: message.clone(),
                });
            }

            if let Some(gate) = &self.gate {
                let permit = gate
                    .acquire()
                    .await
                    .map_err(|e| GazetteError::Internal(e.to_string()))?;
                permit.forget();
            }

            let path = self.output_dir.join(format!("{}_test.html", topic.slug));
            reporter.report(&topic.slug, TopicState::Done, format!("Generated {}", path.display()));
            body.push_str(&format!("<section>{}</section>", topic.label));
            topic_outputs.insert(topic.slug.clone(), path);
        }

        for topic in &self.missing {
            reporter.report(topic, TopicState::Missing, "File not found during consolidation");
        }

        let artifact_path = self.artifact_path();
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(GazetteError::storage)?;
        tokio::fs::write(&artifact_path, format!("<html><body>{body}</body></html>"))
            .await
            .map_err(GazetteError::storage)?;

        Ok(PipelineOutput {
            artifact_path,
            topic_outputs,
        })
    }
}
