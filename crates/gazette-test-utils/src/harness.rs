// SPDX-FileCopyrightText: 2026 Gazette Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles a complete job service with mock adapters, a
//! manual clock, and a temp directory holding the duration cache and the
//! generated artifacts.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};

use gazette_config::model::GazetteConfig;
use gazette_core::{GazetteError, JobId};
use gazette_jobs::{Job, JobRegistry, JobService, ManualClock, RuntimeCache};

use crate::mock_mailer::MockMailer;
use crate::mock_pipeline::MockPipeline;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    config: GazetteConfig,
    pipeline: Option<Box<dyn FnOnce(MockPipeline) -> MockPipeline>>,
    groups: Vec<(String, Vec<String>)>,
    start: DateTime<Utc>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            config: GazetteConfig::default(),
            pipeline: None,
            groups: Vec::new(),
            start: Utc
                .with_ymd_and_hms(2026, 5, 4, 9, 0, 0)
                .single()
                .unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
        }
    }

    /// Start from a custom configuration. The cache path is always
    /// redirected into the harness temp directory.
    pub fn with_config(mut self, config: GazetteConfig) -> Self {
        self.config = config;
        self
    }

    /// Customize the mock pipeline, e.g. `|p| p.failing("boom")`.
    pub fn with_pipeline(mut self, f: impl FnOnce(MockPipeline) -> MockPipeline + 'static) -> Self {
        self.pipeline = Some(Box::new(f));
        self
    }

    /// Define or replace a recipient group.
    pub fn with_group(mut self, name: &str, members: &[&str]) -> Self {
        self.groups.push((
            name.to_string(),
            members.iter().map(|m| m.to_string()).collect(),
        ));
        self
    }

    /// Set the manual clock's starting instant.
    pub fn starting_at(mut self, start: DateTime<Utc>) -> Self {
        self.start = start;
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub fn build(self) -> Result<TestHarness, GazetteError> {
        let temp_dir = tempfile::TempDir::new().map_err(GazetteError::storage)?;

        let mut config = self.config;
        config.runtime.cache_path = temp_dir
            .path()
            .join("topic_runtimes.json")
            .to_string_lossy()
            .into_owned();
        config.pipeline.output_dir = temp_dir.path().join("outputs").to_string_lossy().into_owned();
        for (name, members) in self.groups {
            config.email.groups.insert(name, members);
        }

        let mut pipeline = MockPipeline::new(temp_dir.path().join("outputs"));
        if let Some(customize) = self.pipeline {
            pipeline = customize(pipeline);
        }
        let pipeline = Arc::new(pipeline);
        let mailer = Arc::new(MockMailer::new());
        let clock = Arc::new(ManualClock::new(self.start));
        let registry = Arc::new(JobRegistry::new(clock.clone()));
        let cache = Arc::new(RuntimeCache::from_config(&config.runtime));

        let service = Arc::new(JobService::new(
            &config,
            registry.clone(),
            cache.clone(),
            pipeline.clone(),
            mailer.clone(),
        ));

        Ok(TestHarness {
            service,
            pipeline,
            mailer,
            clock,
            registry,
            cache,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with mock adapters and temp storage.
pub struct TestHarness {
    /// The service under test.
    pub service: Arc<JobService>,
    /// The scripted pipeline.
    pub pipeline: Arc<MockPipeline>,
    /// The capturing mailer.
    pub mailer: Arc<MockMailer>,
    /// Clock shared by the registry and tracker.
    pub clock: Arc<ManualClock>,
    pub registry: Arc<JobRegistry>,
    pub cache: Arc<RuntimeCache>,
    /// Effective configuration (paths point into the temp directory).
    pub config: GazetteConfig,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Default harness: five default topics, empty groups, succeeding pipeline.
    pub fn new() -> Result<Self, GazetteError> {
        Self::builder().build()
    }

    /// Create a job and wait for its worker to finish.
    pub async fn run_to_completion(&self, topics: &[&str]) -> Result<JobId, GazetteError> {
        let id = self.service.create_job(topics)?;
        self.wait_until_settled(&id).await?;
        Ok(id)
    }

    /// Poll until the job's worker has finalized it (ready or failed).
    pub async fn wait_until_settled(&self, id: &JobId) -> Result<Job, GazetteError> {
        self.wait_for(id, Job::is_settled).await
    }

    /// Poll the registry until `predicate` holds for the job, or give up
    /// after five seconds.
    pub async fn wait_for(
        &self,
        id: &JobId,
        predicate: impl Fn(&Job) -> bool,
    ) -> Result<Job, GazetteError> {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            let job = self.registry.get(id)?;
            if predicate(&job) {
                return Ok(job);
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(GazetteError::Internal(format!(
                    "timed out waiting on job {id}"
                )));
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}
