// SPDX-FileCopyrightText: 2026 Gazette Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Applies topic status reports to jobs and feeds the duration cache.
//!
//! A report for an unseen topic inserts it. Otherwise the entry is updated in
//! place, except that `failed` and `missing` are final and `done` can only be
//! repeated or overridden by the consolidation verdict `missing`. The first
//! `done` stamps `ended_at` and yields one duration sample.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use gazette_core::{GazetteError, JobId, TopicEvent, TopicId, TopicState};

use crate::job::{Job, TopicStatus};
use crate::registry::JobRegistry;
use crate::runtime::RuntimeCache;

/// Status reporter bound to a registry and a duration cache.
#[derive(Clone)]
pub struct StatusTracker {
    registry: Arc<JobRegistry>,
    cache: Arc<RuntimeCache>,
}

impl StatusTracker {
    pub fn new(registry: Arc<JobRegistry>, cache: Arc<RuntimeCache>) -> Self {
        Self { registry, cache }
    }

    /// Record that `topic` of `job_id` moved to `state`.
    pub fn report(
        &self,
        job_id: &JobId,
        topic: &TopicId,
        state: TopicState,
        detail: &str,
    ) -> Result<(), GazetteError> {
        let now = self.registry.now();
        let sample = self
            .registry
            .update(job_id, |job| apply_report(job, topic, state, detail, now))?;

        #[cfg(feature = "prometheus")]
        gazette_prometheus::record_topic_transition(&state.to_string());

        // The job entry is released before touching the cache file.
        if let Some(seconds) = sample {
            debug!(job_id = %job_id, topic = %topic, seconds, "topic finished");
            #[cfg(feature = "prometheus")]
            gazette_prometheus::record_topic_duration(seconds);
            if let Err(e) = self.cache.record(topic, seconds) {
                warn!(topic = %topic, error = %e, "failed to persist duration sample");
            }
        }
        Ok(())
    }

    /// [`StatusTracker::report`] for a queued pipeline event.
    pub fn apply(&self, job_id: &JobId, event: &TopicEvent) -> Result<(), GazetteError> {
        self.report(job_id, &event.topic, event.state, &event.detail)
    }
}

fn transition_allowed(from: TopicState, to: TopicState) -> bool {
    match from {
        TopicState::Failed | TopicState::Missing => false,
        TopicState::Done => matches!(to, TopicState::Done | TopicState::Missing),
        TopicState::Queued | TopicState::Running => true,
    }
}

/// Mutate the job for one report. Returns the duration in seconds when this
/// report completes the topic for the first time with a positive duration.
fn apply_report(
    job: &mut Job,
    topic: &TopicId,
    state: TopicState,
    detail: &str,
    now: DateTime<Utc>,
) -> Option<f64> {
    let Some(entry) = job.topic_mut(topic) else {
        job.status.push(TopicStatus {
            topic: topic.clone(),
            state,
            message: detail.to_string(),
            started_at: Some(now),
            ended_at: (state == TopicState::Done).then_some(now),
        });
        return None;
    };

    if !transition_allowed(entry.state, state) {
        debug!(topic = %topic, from = %entry.state, to = %state, "ignoring report for finished topic");
        return None;
    }

    entry.state = state;
    entry.message = detail.to_string();

    if matches!(state, TopicState::Running | TopicState::Done) && entry.started_at.is_none() {
        entry.started_at = Some(now);
    }

    if state != TopicState::Done || entry.ended_at.is_some() {
        return None;
    }
    entry.ended_at = Some(now);
    let started = entry.started_at.unwrap_or(now);
    let seconds = (now - started).num_milliseconds() as f64 / 1000.0;
    (seconds > 0.0).then_some(seconds)
}
