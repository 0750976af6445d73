// SPDX-FileCopyrightText: 2026 Gazette Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The job record and its per-topic status entries.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use thiserror::Error;

use gazette_core::{JobId, TopicId, TopicState};

use crate::ledger::SendHistory;

/// Lifecycle of one topic inside a job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicStatus {
    pub topic: TopicId,
    pub state: TopicState,
    pub message: String,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl TopicStatus {
    pub fn queued(topic: TopicId) -> Self {
        Self {
            topic,
            state: TopicState::Queued,
            message: "Queued".to_string(),
            started_at: None,
            ended_at: None,
        }
    }
}

/// Why the last send attempt did not go out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmailError {
    #[error("No recipients selected.")]
    NoRecipients,
    #[error("Draft is not ready or not approved.")]
    NotApproved,
    #[error("{0}")]
    Delivery(String),
}

impl EmailError {
    /// Validation failures the user can fix themselves.
    pub fn is_user_fixable(&self) -> bool {
        matches!(self, EmailError::NoRecipients | EmailError::NotApproved)
    }
}

impl Serialize for EmailError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Email form state and outcome of the most recent send.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailState {
    pub sending: bool,
    pub sent: bool,
    pub sent_to: Vec<String>,
    pub last_error: Option<EmailError>,
    pub group: String,
    pub extra_recipients: String,
    pub subject: String,
}

impl Default for EmailState {
    fn default() -> Self {
        Self {
            sending: false,
            sent: false,
            sent_to: Vec::new(),
            last_error: None,
            group: "all".to_string(),
            extra_recipients: String::new(),
            subject: String::new(),
        }
    }
}

/// One newsletter-generation run.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub selected_topics: Vec<TopicId>,
    /// Per-topic status in selection order.
    pub status: Vec<TopicStatus>,
    pub output_ready: bool,
    pub output_location: Option<PathBuf>,
    pub terminal_error: Option<String>,
    pub review_confirmed: bool,
    pub approved: bool,
    pub email_state: EmailState,
    pub send_history: SendHistory,
    pub created_at: DateTime<Utc>,
}

impl Job {
    /// A fresh job with every selected topic queued.
    pub fn new(id: JobId, selected_topics: Vec<TopicId>, created_at: DateTime<Utc>) -> Self {
        let status = selected_topics.iter().cloned().map(TopicStatus::queued).collect();
        Self {
            id,
            selected_topics,
            status,
            output_ready: false,
            output_location: None,
            terminal_error: None,
            review_confirmed: false,
            approved: false,
            email_state: EmailState::default(),
            send_history: SendHistory::default(),
            created_at,
        }
    }

    pub fn topic(&self, topic: &TopicId) -> Option<&TopicStatus> {
        self.status.iter().find(|s| &s.topic == topic)
    }

    pub fn topic_mut(&mut self, topic: &TopicId) -> Option<&mut TopicStatus> {
        self.status.iter_mut().find(|s| &s.topic == topic)
    }

    pub fn all_done(&self) -> bool {
        self.status.iter().all(|s| s.state == TopicState::Done)
    }

    /// Whether the worker has finished, successfully or not.
    pub fn is_settled(&self) -> bool {
        self.output_ready || self.terminal_error.is_some()
    }

    /// Artifact written and still on disk, no error, every topic done.
    ///
    /// Touches the filesystem, so never call it while holding a registry
    /// entry. Check [`Job::artifact_on_disk`] on a snapshot and pass the
    /// answer to [`Job::is_ready_given`] instead.
    pub fn is_ready(&self) -> bool {
        self.is_ready_given(self.artifact_on_disk())
    }

    /// Readiness with the artifact's presence supplied by the caller.
    pub fn is_ready_given(&self, artifact_present: bool) -> bool {
        self.output_ready
            && self.terminal_error.is_none()
            && self.all_done()
            && self.output_location.is_some()
            && artifact_present
    }

    pub fn artifact_on_disk(&self) -> bool {
        self.output_location.as_ref().is_some_and(|p| p.exists())
    }

    /// Month the run is published under, e.g. "May".
    pub fn edition(&self) -> String {
        self.created_at.format("%B").to_string()
    }

    /// Settle a successful run: every topic that did not fail is finished.
    pub(crate) fn mark_succeeded(&mut self, artifact: PathBuf) {
        for entry in &mut self.status {
            if entry.state != TopicState::Failed {
                entry.state = TopicState::Done;
                entry.message = "Finished.".to_string();
            }
        }
        self.output_location = Some(artifact);
        self.output_ready = true;
    }

    /// Settle a failed run: anything still pending fails with the error.
    pub(crate) fn mark_failed(&mut self, error: &str) {
        self.terminal_error = Some(error.to_string());
        for entry in &mut self.status {
            if matches!(entry.state, TopicState::Queued | TopicState::Running) {
                entry.state = TopicState::Failed;
                entry.message = format!("Failed: {error}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(topics: &[&str]) -> Job {
        Job::new(
            JobId::generate(),
            topics.iter().map(|t| TopicId::from(*t)).collect(),
            DateTime::<Utc>::UNIX_EPOCH,
        )
    }

    #[test]
    fn new_job_queues_every_topic_in_order() {
        let job = job(&["it_hacks", "ai_at_work"]);
        let order: Vec<&str> = job.status.iter().map(|s| s.topic.as_str()).collect();
        assert_eq!(order, vec!["it_hacks", "ai_at_work"]);
        assert!(job.status.iter().all(|s| s.state == TopicState::Queued
            && s.message == "Queued"
            && s.started_at.is_none()));
        assert!(!job.is_ready());
        assert!(!job.is_settled());
    }

    #[test]
    fn success_settles_missing_but_keeps_failed() {
        let mut job = job(&["a", "b", "c"]);
        job.status[0].state = TopicState::Missing;
        job.status[1].state = TopicState::Failed;
        job.mark_succeeded(PathBuf::from("/nonexistent/newsletter.html"));

        assert_eq!(job.status[0].state, TopicState::Done);
        assert_eq!(job.status[0].message, "Finished.");
        assert_eq!(job.status[1].state, TopicState::Failed);
        assert_eq!(job.status[2].state, TopicState::Done);
        assert!(job.output_ready);
        // Artifact is not on disk, so the job is not ready.
        assert!(!job.is_ready());
    }

    #[test]
    fn failure_only_touches_pending_topics() {
        let mut job = job(&["a", "b", "c"]);
        job.status[0].state = TopicState::Done;
        job.status[1].state = TopicState::Running;
        job.mark_failed("crew exploded");

        assert_eq!(job.terminal_error.as_deref(), Some("crew exploded"));
        assert_eq!(job.status[0].state, TopicState::Done);
        assert_eq!(job.status[1].state, TopicState::Failed);
        assert_eq!(job.status[1].message, "Failed: crew exploded");
        assert_eq!(job.status[2].state, TopicState::Failed);
        assert!(job.is_settled());
    }

    #[test]
    fn ready_requires_artifact_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("newsletter_email_May.html");
        std::fs::write(&artifact, "<html></html>").unwrap();

        let mut job = job(&["a"]);
        job.mark_succeeded(artifact.clone());
        assert!(job.is_ready());

        std::fs::remove_file(&artifact).unwrap();
        assert!(!job.is_ready());
    }

    #[test]
    fn readiness_takes_artifact_presence_from_caller() {
        let mut job = job(&["a"]);
        assert!(!job.is_ready_given(true));

        job.mark_succeeded(PathBuf::from("/nonexistent/newsletter.html"));
        assert!(!job.artifact_on_disk());
        assert!(job.is_ready_given(true));
        assert!(!job.is_ready_given(false));

        job.terminal_error = Some("late failure".to_string());
        assert!(!job.is_ready_given(true));
    }

    #[test]
    fn edition_is_the_creation_month() {
        let created = "2026-04-30T23:59:59Z".parse::<DateTime<Utc>>().unwrap();
        let job = Job::new(JobId::generate(), vec![TopicId::from("a")], created);
        assert_eq!(job.edition(), "April");
    }

    #[test]
    fn email_errors_render_user_text() {
        assert_eq!(EmailError::NoRecipients.to_string(), "No recipients selected.");
        assert_eq!(
            EmailError::NotApproved.to_string(),
            "Draft is not ready or not approved."
        );
        assert_eq!(EmailError::Delivery("535 auth".into()).to_string(), "535 auth");
        assert!(!EmailError::Delivery("x".into()).is_user_fixable());
        assert_eq!(
            serde_json::to_value(EmailError::NoRecipients).unwrap(),
            "No recipients selected."
        );
    }
}
