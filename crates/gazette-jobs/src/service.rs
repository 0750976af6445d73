// SPDX-FileCopyrightText: 2026 Gazette Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport-agnostic operations behind the polling UI.
//!
//! [`JobService`] ties the registry, tracker, duration cache, catalog,
//! recipient groups and the two external collaborators together. Every
//! handler in the gateway is a thin wrapper around one method here.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use gazette_config::GazetteConfig;
use gazette_core::{GazetteError, JobId, MailerAdapter, PipelineAdapter, TopicDefinition};

use crate::job::{EmailError, EmailState, Job, TopicStatus};
use crate::ledger::{SendAttempt, SendOutcome};
use crate::notice::{Notice, NoticeFacts, describe};
use crate::progress::ProgressModel;
use crate::recipients::RecipientDirectory;
use crate::registry::JobRegistry;
use crate::runtime::RuntimeCache;
use crate::topics::TopicCatalog;
use crate::tracker::StatusTracker;
use crate::worker::JobWorker;

/// Everything a polling client needs to render one job.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub job_id: JobId,
    pub topics: Vec<TopicStatus>,
    pub progress: u8,
    pub ready: bool,
    pub notice: Notice,
    pub terminal_error: Option<String>,
    pub review_confirmed: bool,
    pub approved: bool,
    pub email_state: EmailState,
    pub send_history: Vec<SendAttempt>,
    pub next_send_label: &'static str,
    pub next_send_hint: &'static str,
    pub resolved_recipients: Vec<String>,
    pub default_subject: String,
}

/// Email form submission. Absent fields keep the job's current values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendRequest {
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub extra: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
}

/// The consolidated document of a finished job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

enum SendPlan {
    Blocked,
    Deliver {
        recipients: Vec<String>,
        subject: String,
        artifact: PathBuf,
    },
}

/// The job subsystem's public face.
pub struct JobService {
    registry: Arc<JobRegistry>,
    cache: Arc<RuntimeCache>,
    catalog: TopicCatalog,
    recipients: RecipientDirectory,
    progress: ProgressModel,
    worker: JobWorker,
    mailer: Arc<dyn MailerAdapter>,
    subject_prefix: String,
}

impl JobService {
    pub fn new(
        config: &GazetteConfig,
        registry: Arc<JobRegistry>,
        cache: Arc<RuntimeCache>,
        pipeline: Arc<dyn PipelineAdapter>,
        mailer: Arc<dyn MailerAdapter>,
    ) -> Self {
        let tracker = StatusTracker::new(registry.clone(), cache.clone());
        let worker = JobWorker::new(registry.clone(), tracker, pipeline);
        Self {
            registry,
            cache,
            catalog: TopicCatalog::from_config(&config.topics),
            recipients: RecipientDirectory::from_config(&config.email),
            progress: ProgressModel::from_config(&config.runtime),
            worker,
            mailer,
            subject_prefix: config.email.subject_prefix.clone(),
        }
    }

    pub fn registry(&self) -> &Arc<JobRegistry> {
        &self.registry
    }

    pub fn topics(&self) -> &[TopicDefinition] {
        self.catalog.all()
    }

    pub fn recipient_groups(&self) -> Vec<String> {
        self.recipients.group_names().map(str::to_string).collect()
    }

    /// "{prefix} - {Month}" for the current month.
    pub fn default_subject(&self) -> String {
        self.subject_for(&self.registry.now().format("%B").to_string())
    }

    /// "{prefix} - {edition}", the subject a job is sent under by default.
    fn subject_for(&self, edition: &str) -> String {
        format!("{} - {edition}", self.subject_prefix)
    }

    /// Snapshot the job and check its artifact outside the entry lock.
    fn snapshot_with_artifact(&self, id: &JobId) -> Result<(Job, bool), GazetteError> {
        let snapshot = self.registry.get(id)?;
        let present = snapshot.artifact_on_disk();
        Ok((snapshot, present))
    }

    /// Register a run for the requested topics and start it in the background.
    ///
    /// Slugs are canonicalized and filtered to the catalog; if nothing known
    /// remains the request fails with [`GazetteError::InvalidSelection`].
    pub fn create_job<S: AsRef<str>>(&self, requested: &[S]) -> Result<JobId, GazetteError> {
        let topics = self.catalog.select(requested);
        if topics.is_empty() {
            return Err(GazetteError::InvalidSelection(
                "Pick sections to start a run.".to_string(),
            ));
        }

        let id = self
            .registry
            .create(topics.iter().map(|t| t.slug.clone()).collect())?;
        info!(job_id = %id, topics = topics.len(), "run requested");

        #[cfg(feature = "prometheus")]
        {
            gazette_prometheus::record_job_created();
            gazette_prometheus::set_active_jobs(self.registry.active_count() as f64);
        }

        let edition = self.registry.get(&id)?.edition();
        self.worker.spawn(id.clone(), edition, topics);
        Ok(id)
    }

    /// Render the job for a poll. A ready job is marked review-confirmed.
    pub fn get_status(&self, id: &JobId) -> Result<StatusReport, GazetteError> {
        let (mut job, present) = self.snapshot_with_artifact(id)?;
        let ready = job.is_ready_given(present);
        if ready && !job.review_confirmed {
            self.registry.update(id, |entry| entry.review_confirmed = true)?;
            job.review_confirmed = true;
        }

        let now = self.registry.now();
        let progress = self
            .progress
            .percent_complete(&job.status, &self.cache.snapshot(), now);
        let resolved_recipients = self
            .recipients
            .resolve(&job.email_state.group, &job.email_state.extra_recipients);
        let notice = describe(
            Some(&job),
            NoticeFacts {
                ready,
                progress,
                recipient_count: resolved_recipients.len(),
            },
        );

        let default_subject = self.subject_for(&job.edition());
        Ok(StatusReport {
            job_id: job.id,
            topics: job.status,
            progress,
            ready,
            notice,
            terminal_error: job.terminal_error,
            review_confirmed: job.review_confirmed,
            approved: job.approved,
            email_state: job.email_state,
            next_send_label: job.send_history.next_send_label(),
            next_send_hint: job.send_history.next_send_hint(),
            send_history: job.send_history.as_slice().to_vec(),
            resolved_recipients,
            default_subject,
        })
    }

    /// Tick or untick the review checkbox.
    pub fn set_review_confirmed(&self, id: &JobId, confirmed: bool) -> Result<(), GazetteError> {
        self.registry
            .update(id, |job| job.review_confirmed = confirmed)
    }

    /// Approve a ready draft, unlocking email.
    pub fn approve(&self, id: &JobId) -> Result<(), GazetteError> {
        let (_, present) = self.snapshot_with_artifact(id)?;
        self.registry.update(id, |job| {
            if !job.is_ready_given(present) {
                return Err(GazetteError::NotReady {
                    job_id: id.to_string(),
                });
            }
            job.approved = true;
            job.review_confirmed = false;
            job.email_state.last_error = None;
            Ok(())
        })??;
        info!(job_id = %id, "draft approved");
        Ok(())
    }

    /// Attempt to email the consolidated document.
    ///
    /// Blocked and failed attempts are recorded and reflected in the returned
    /// notice rather than returned as errors.
    pub async fn send_email(&self, id: &JobId, request: SendRequest) -> Result<Notice, GazetteError> {
        let (snapshot, present) = self.snapshot_with_artifact(id)?;
        let default_subject = self.subject_for(&snapshot.edition());
        let now = self.registry.now();

        let plan = self.registry.update(id, |job| {
            if !(job.is_ready_given(present) && job.approved) {
                let subject = pick_subject(request.subject.as_deref(), &default_subject);
                job.email_state.last_error = Some(EmailError::NotApproved);
                job.send_history.record(
                    SendOutcome::Blocked,
                    &[],
                    &subject,
                    Some(EmailError::NotApproved.to_string()),
                    now,
                );
                return SendPlan::Blocked;
            }

            let email = &mut job.email_state;
            if let Some(group) = request.group {
                email.group = group;
            }
            if let Some(extra) = request.extra {
                email.extra_recipients = extra;
            }
            email.subject = pick_subject(request.subject.as_deref(), &default_subject);
            email.sending = true;
            email.last_error = None;
            email.sent = false;
            email.sent_to.clear();

            let recipients = self.recipients.resolve(&email.group, &email.extra_recipients);
            let subject = email.subject.clone();
            if recipients.is_empty() {
                email.last_error = Some(EmailError::NoRecipients);
                email.sending = false;
                job.send_history.record(
                    SendOutcome::Blocked,
                    &[],
                    &subject,
                    Some(EmailError::NoRecipients.to_string()),
                    now,
                );
                return SendPlan::Blocked;
            }

            match job.output_location.clone() {
                Some(artifact) => SendPlan::Deliver {
                    recipients,
                    subject,
                    artifact,
                },
                // Readiness implies a location; treat a vanished one as not ready.
                None => {
                    job.email_state.sending = false;
                    job.email_state.last_error = Some(EmailError::NotApproved);
                    SendPlan::Blocked
                }
            }
        })?;

        match plan {
            SendPlan::Blocked => {
                #[cfg(feature = "prometheus")]
                gazette_prometheus::record_email_attempt("blocked");
            }
            SendPlan::Deliver {
                recipients,
                subject,
                artifact,
            } => {
                let delivery = match tokio::fs::read_to_string(&artifact).await {
                    Ok(html) => self.mailer.send(&recipients, &subject, &html).await,
                    Err(e) => Err(GazetteError::storage(e)),
                };
                let finished = self.registry.now();
                let outcome = self.registry.update(id, |job| {
                    job.email_state.sending = false;
                    match &delivery {
                        Ok(()) => {
                            job.email_state.sent = true;
                            job.email_state.sent_to = recipients.clone();
                            job.send_history
                                .record(SendOutcome::Success, &recipients, &subject, None, finished);
                            SendOutcome::Success
                        }
                        Err(e) => {
                            let message = e.to_string();
                            job.email_state.last_error = Some(EmailError::Delivery(message.clone()));
                            job.send_history.record(
                                SendOutcome::Failed,
                                &recipients,
                                &subject,
                                Some(message),
                                finished,
                            );
                            SendOutcome::Failed
                        }
                    }
                })?;

                match &delivery {
                    Ok(()) => {
                        info!(job_id = %id, %outcome, recipients = recipients.len(), "newsletter emailed")
                    }
                    Err(e) => warn!(job_id = %id, %outcome, error = %e, "newsletter email failed"),
                }
                #[cfg(feature = "prometheus")]
                gazette_prometheus::record_email_attempt(&outcome.to_string());
            }
        }

        Ok(self.get_status(id)?.notice)
    }

    /// The consolidated document, for download.
    pub async fn download(&self, id: &JobId) -> Result<Artifact, GazetteError> {
        let job = self.registry.get(id)?;
        let missing = || GazetteError::ArtifactMissing {
            job_id: id.to_string(),
        };
        let path = job
            .output_location
            .filter(|_| job.output_ready)
            .ok_or_else(missing)?;
        let bytes = tokio::fs::read(&path).await.map_err(|_| missing())?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "newsletter.html".to_string());
        Ok(Artifact { file_name, bytes })
    }
}

fn pick_subject(requested: Option<&str>, default_subject: &str) -> String {
    requested
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(default_subject)
        .to_string()
}
