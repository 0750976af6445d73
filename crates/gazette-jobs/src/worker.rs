// SPDX-FileCopyrightText: 2026 Gazette Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background execution of one job's pipeline.
//!
//! Each job gets its own detached tokio task. The pipeline posts status
//! events into an unbounded channel that the task drains concurrently, in
//! order, through the [`StatusTracker`]. The pipeline itself runs on a child
//! task so a panic inside it surfaces as a failed run instead of killing the
//! drain. Once the pipeline returns and every queued event has been applied,
//! the job is finalized as a whole.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info, warn};

use gazette_core::{GazetteError, JobId, PipelineAdapter, TopicDefinition, TopicReporter};

use crate::registry::JobRegistry;
use crate::tracker::StatusTracker;

/// Runs pipelines for jobs and settles their final state.
#[derive(Clone)]
pub struct JobWorker {
    registry: Arc<JobRegistry>,
    tracker: StatusTracker,
    pipeline: Arc<dyn PipelineAdapter>,
}

impl JobWorker {
    pub fn new(
        registry: Arc<JobRegistry>,
        tracker: StatusTracker,
        pipeline: Arc<dyn PipelineAdapter>,
    ) -> Self {
        Self {
            registry,
            tracker,
            pipeline,
        }
    }

    /// Start the job on its own task and return immediately.
    pub fn spawn(&self, job_id: JobId, edition: String, topics: Vec<TopicDefinition>) -> JoinHandle<()> {
        let worker = self.clone();
        tokio::spawn(async move { worker.run(&job_id, &edition, &topics).await })
    }

    /// Run the pipeline to completion and finalize the job.
    pub async fn run(&self, job_id: &JobId, edition: &str, topics: &[TopicDefinition]) {
        info!(
            job_id = %job_id,
            pipeline = self.pipeline.name(),
            edition,
            topics = topics.len(),
            "job started"
        );

        let (tx, mut rx) = mpsc::unbounded_channel();
        let reporter = TopicReporter::new(tx);

        let drain = async {
            while let Some(event) = rx.recv().await {
                if let Err(e) = self.tracker.apply(job_id, &event) {
                    warn!(job_id = %job_id, topic = %event.topic, error = %e, "dropping status event");
                }
            }
        };
        let pipeline = self.pipeline.clone();
        let owned_edition = edition.to_string();
        let owned_topics = topics.to_vec();
        let run = tokio::spawn(async move {
            pipeline
                .run(&owned_edition, &owned_topics, reporter)
                .await
        });
        let (joined, ()) = tokio::join!(run, drain);
        let result = joined.unwrap_or_else(|e| {
            Err(GazetteError::Pipeline {
                message: join_failure_message(e),
            })
        });

        let outcome = match result {
            Ok(output) => {
                let artifact = output.artifact_path.display().to_string();
                let settled = self
                    .registry
                    .update(job_id, |job| job.mark_succeeded(output.artifact_path));
                if settled.is_ok() {
                    info!(job_id = %job_id, artifact = %artifact, "job finished");
                }
                settled.map(|()| "success")
            }
            Err(e) => {
                let message = e.to_string();
                error!(job_id = %job_id, error = %message, "job failed");
                self.registry
                    .update(job_id, |job| job.mark_failed(&message))
                    .map(|()| "failure")
            }
        };

        match outcome {
            Ok(_outcome) => {
                #[cfg(feature = "prometheus")]
                {
                    gazette_prometheus::record_job_finished(_outcome);
                    gazette_prometheus::set_active_jobs(self.registry.active_count() as f64);
                }
            }
            Err(e) => warn!(job_id = %job_id, error = %e, "job vanished before it could be finalized"),
        }
    }
}

/// Describe why the pipeline task ended without returning.
fn join_failure_message(err: JoinError) -> String {
    match err.try_into_panic() {
        Ok(payload) => {
            let detail = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic payload".to_string());
            format!("pipeline panicked: {detail}")
        }
        Err(_) => "pipeline task was cancelled".to_string(),
    }
}
