// SPDX-FileCopyrightText: 2026 Gazette Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only history of email send attempts for one job.
//!
//! Every attempt, whether delivered, failed in transport, or blocked before
//! reaching the mailer, gets a numbered entry. Entries are never edited or
//! removed, so the history doubles as an audit trail for resends.

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::Display;

/// How a send attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SendOutcome {
    Success,
    Failed,
    Blocked,
}

/// One recorded send attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SendAttempt {
    /// 1-based, strictly increasing within a job.
    pub attempt: u32,
    pub outcome: SendOutcome,
    /// "First send" or "Resend".
    pub label: String,
    pub recipient_count: usize,
    pub recipients: Vec<String>,
    pub subject: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Label for the attempt numbered `attempt`.
pub fn attempt_label(attempt: u32) -> &'static str {
    if attempt == 1 { "First send" } else { "Resend" }
}

/// The send history of a job. Only [`SendHistory::record`] can grow it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SendHistory {
    attempts: Vec<SendAttempt>,
}

impl SendHistory {
    /// Append a new attempt and return a copy of it.
    pub fn record(
        &mut self,
        outcome: SendOutcome,
        recipients: &[String],
        subject: &str,
        error: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> SendAttempt {
        let attempt = u32::try_from(self.attempts.len()).map_or(u32::MAX, |n| n.saturating_add(1));
        let entry = SendAttempt {
            attempt,
            outcome,
            label: attempt_label(attempt).to_string(),
            recipient_count: recipients.len(),
            recipients: recipients.to_vec(),
            subject: subject.to_string(),
            timestamp,
            error,
        };
        self.attempts.push(entry.clone());
        entry
    }

    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SendAttempt> {
        self.attempts.iter()
    }

    pub fn last(&self) -> Option<&SendAttempt> {
        self.attempts.last()
    }

    pub fn as_slice(&self) -> &[SendAttempt] {
        &self.attempts
    }

    /// Caption for the send button.
    pub fn next_send_label(&self) -> &'static str {
        if self.is_empty() { "Send Email" } else { "Resend Email" }
    }

    /// Hint shown next to the send button.
    pub fn next_send_hint(&self) -> &'static str {
        if self.is_empty() { "First send" } else { "Resend" }
    }
}
