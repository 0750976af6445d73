// SPDX-FileCopyrightText: 2026 Gazette Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The single banner shown above a job's status.
//!
//! Conditions are checked in a fixed priority order and the first match
//! wins, so a failed run always reports its failure even while an email
//! flag is still set.

use serde::Serialize;
use strum::Display;

use crate::job::Job;

/// Severity of a banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub message: String,
    pub level: NoticeLevel,
}

impl Notice {
    fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level,
        }
    }
}

/// Values derived from the job (and the filesystem) before resolving.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoticeFacts {
    pub ready: bool,
    pub progress: u8,
    pub recipient_count: usize,
}

fn recipients_noun(count: usize) -> &'static str {
    if count == 1 { "recipient" } else { "recipients" }
}

/// Resolve the banner for `job`.
pub fn describe(job: Option<&Job>, facts: NoticeFacts) -> Notice {
    let Some(job) = job else {
        return Notice::new(NoticeLevel::Info, "Pick sections to start a run.");
    };

    if let Some(error) = &job.terminal_error {
        return Notice::new(NoticeLevel::Danger, format!("Generation failed: {error}"));
    }

    let email = &job.email_state;
    if email.sending {
        return Notice::new(NoticeLevel::Info, "Sending email...");
    }

    if let Some(error) = &email.last_error {
        let level = if error.is_user_fixable() {
            NoticeLevel::Warning
        } else {
            NoticeLevel::Danger
        };
        return Notice::new(level, format!("Email error: {error}"));
    }

    if email.sent {
        let count = email.sent_to.len();
        return Notice::new(
            NoticeLevel::Success,
            format!("Email sent to {count} {}.", recipients_noun(count)),
        );
    }

    if facts.ready && job.approved {
        let count = facts.recipient_count;
        if count == 0 {
            return Notice::new(NoticeLevel::Warning, "Draft approved. Add recipients to send.");
        }
        return Notice::new(
            NoticeLevel::Success,
            format!("Draft approved. Ready to send to {count} {}.", recipients_noun(count)),
        );
    }

    if facts.ready {
        return Notice::new(
            NoticeLevel::Success,
            "Draft ready. Review and approve to unlock email.",
        );
    }

    if !job.status.is_empty() {
        return Notice::new(
            NoticeLevel::Info,
            format!("Research in progress ({}% complete).", facts.progress),
        );
    }

    Notice::new(NoticeLevel::Info, "Run started. Preparing tasks...")
}
