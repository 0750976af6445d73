// SPDX-FileCopyrightText: 2026 Gazette Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Job and progress tracking for newsletter runs.
//!
//! A run request becomes a [`Job`] in the [`JobRegistry`] with every selected
//! topic queued. A [`JobWorker`] task drives the generation pipeline and
//! feeds its status events through the [`StatusTracker`], which also collects
//! run durations into the [`RuntimeCache`]. Polls go through [`JobService`],
//! which combines the [`ProgressModel`] estimate, the banner from
//! [`notice::describe`], resolved recipients and the send history.

pub mod clock;
pub mod job;
pub mod ledger;
pub mod notice;
pub mod progress;
pub mod recipients;
pub mod registry;
pub mod runtime;
pub mod service;
pub mod topics;
pub mod tracker;
pub mod worker;

pub use clock::{Clock, ManualClock, SystemClock};
pub use job::{EmailError, EmailState, Job, TopicStatus};
pub use ledger::{SendAttempt, SendHistory, SendOutcome};
pub use notice::{Notice, NoticeFacts, NoticeLevel};
pub use progress::ProgressModel;
pub use recipients::RecipientDirectory;
pub use registry::JobRegistry;
pub use runtime::{RuntimeCache, RuntimeSamples};
pub use service::{Artifact, JobService, SendRequest, StatusReport};
pub use topics::{TopicCatalog, canonicalize_slug};
pub use tracker::StatusTracker;
pub use worker::JobWorker;
