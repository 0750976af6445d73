// SPDX-FileCopyrightText: 2026 Gazette Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Concurrent in-memory store of jobs.
//!
//! Reads hand out cloned snapshots so callers never hold a map shard across an
//! await point. Mutations run a closure against the job while its entry is
//! locked, which keeps multi-field updates (finalization, approval, send
//! bookkeeping) atomic with respect to readers.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::{debug, info};

use gazette_core::{GazetteError, JobId, TopicId};

use crate::clock::{Clock, SystemClock};
use crate::job::Job;

/// Registry of every job this process knows about.
pub struct JobRegistry {
    jobs: DashMap<JobId, Job>,
    clock: Arc<dyn Clock>,
}

impl JobRegistry {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            jobs: DashMap::new(),
            clock,
        }
    }

    pub fn with_system_clock() -> Self {
        Self::new(Arc::new(SystemClock))
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Register a new job with every topic queued.
    ///
    /// Duplicate topics are collapsed, keeping the first occurrence.
    pub fn create(&self, topics: Vec<TopicId>) -> Result<JobId, GazetteError> {
        let mut selected: Vec<TopicId> = Vec::with_capacity(topics.len());
        for topic in topics {
            if !selected.contains(&topic) {
                selected.push(topic);
            }
        }
        if selected.is_empty() {
            return Err(GazetteError::InvalidSelection(
                "at least one topic must be selected".to_string(),
            ));
        }

        let id = JobId::generate();
        let job = Job::new(id.clone(), selected, self.now());
        debug!(job_id = %id, topics = job.selected_topics.len(), "job registered");
        self.jobs.insert(id.clone(), job);
        Ok(id)
    }

    /// Snapshot of a job.
    pub fn get(&self, id: &JobId) -> Result<Job, GazetteError> {
        self.jobs
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| not_found(id))
    }

    /// Run `f` against the job while its entry is locked.
    ///
    /// `f` must not call back into the registry.
    pub fn update<R>(&self, id: &JobId, f: impl FnOnce(&mut Job) -> R) -> Result<R, GazetteError> {
        let mut entry = self.jobs.get_mut(id).ok_or_else(|| not_found(id))?;
        Ok(f(entry.value_mut()))
    }

    pub fn contains(&self, id: &JobId) -> bool {
        self.jobs.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Jobs whose worker has not finished yet.
    pub fn active_count(&self) -> usize {
        self.jobs.iter().filter(|entry| !entry.is_settled()).count()
    }

    /// Evict settled jobs created more than `retention` ago.
    ///
    /// Jobs whose worker is still running are kept regardless of age.
    pub fn reap(&self, retention: std::time::Duration) -> Vec<JobId> {
        let Ok(retention) = chrono::Duration::from_std(retention) else {
            return Vec::new();
        };
        let Some(cutoff) = self.now().checked_sub_signed(retention) else {
            return Vec::new();
        };

        let expired: Vec<JobId> = self
            .jobs
            .iter()
            .filter(|entry| entry.is_settled() && entry.created_at < cutoff)
            .map(|entry| entry.key().clone())
            .collect();

        let mut removed = Vec::with_capacity(expired.len());
        for id in expired {
            if self
                .jobs
                .remove_if(&id, |_, job| job.is_settled() && job.created_at < cutoff)
                .is_some()
            {
                removed.push(id);
            }
        }
        if !removed.is_empty() {
            info!(count = removed.len(), "reaped expired jobs");
        }
        removed
    }
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::with_system_clock()
    }
}

fn not_found(id: &JobId) -> GazetteError {
    GazetteError::JobNotFound {
        job_id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use gazette_core::TopicState;

    use super::*;
    use crate::clock::ManualClock;

    fn topics(slugs: &[&str]) -> Vec<TopicId> {
        slugs.iter().map(|s| TopicId::from(*s)).collect()
    }

    #[test]
    fn create_then_get_returns_queued_job() {
        let registry = JobRegistry::default();
        let id = registry.create(topics(&["it_hacks", "tech_trends"])).unwrap();
        let job = registry.get(&id).unwrap();
        assert_eq!(job.id, id);
        assert_eq!(job.status.len(), 2);
        assert!(job.status.iter().all(|s| s.state == TopicState::Queued));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn empty_selection_is_rejected() {
        let registry = JobRegistry::default();
        let err = registry.create(Vec::new()).unwrap_err();
        assert!(matches!(err, GazetteError::InvalidSelection(_)));
        assert!(registry.is_empty());
    }

    #[test]
    fn duplicate_topics_collapse() {
        let registry = JobRegistry::default();
        let id = registry
            .create(topics(&["it_hacks", "ai_at_work", "it_hacks"]))
            .unwrap();
        let job = registry.get(&id).unwrap();
        assert_eq!(job.selected_topics, topics(&["it_hacks", "ai_at_work"]));
    }

    #[test]
    fn unknown_id_is_not_found() {
        let registry = JobRegistry::default();
        let missing = JobId::from("does-not-exist");
        assert!(registry.get(&missing).unwrap_err().is_not_found());
        assert!(registry.update(&missing, |_| ()).unwrap_err().is_not_found());
    }

    #[test]
    fn ids_are_unique() {
        let registry = JobRegistry::default();
        let a = registry.create(topics(&["a"])).unwrap();
        let b = registry.create(topics(&["a"])).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn snapshots_do_not_alias_the_store() {
        let registry = JobRegistry::default();
        let id = registry.create(topics(&["a"])).unwrap();
        let mut snapshot = registry.get(&id).unwrap();
        snapshot.approved = true;
        assert!(!registry.get(&id).unwrap().approved);
    }

    #[test]
    fn reap_evicts_only_settled_jobs_past_retention() {
        let clock = Arc::new(ManualClock::default());
        let registry = JobRegistry::new(clock.clone());

        let finished = registry.create(topics(&["a"])).unwrap();
        let failed = registry.create(topics(&["a"])).unwrap();
        let running = registry.create(topics(&["a"])).unwrap();
        registry
            .update(&finished, |job| job.mark_succeeded(PathBuf::from("out.html")))
            .unwrap();
        registry.update(&failed, |job| job.mark_failed("boom")).unwrap();
        assert_eq!(registry.active_count(), 1);

        clock.advance_secs(30);
        assert!(registry.reap(Duration::from_secs(60)).is_empty());

        clock.advance_secs(60);
        let mut reaped = registry.reap(Duration::from_secs(60));
        reaped.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        let mut expected = vec![finished, failed];
        expected.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        assert_eq!(reaped, expected);
        assert!(registry.contains(&running));
        assert_eq!(registry.len(), 1);
    }
}
