// SPDX-FileCopyrightText: 2026 Gazette Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock mail transport that captures outgoing newsletters.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use gazette_core::traits::adapter::PluginAdapter;
use gazette_core::traits::mailer::MailerAdapter;
use gazette_core::types::{AdapterType, HealthStatus};
use gazette_core::GazetteError;

/// A message handed to the mock transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub recipients: Vec<String>,
    pub subject: String,
    pub html_body: String,
}

/// A mailer that records every successful send.
///
/// Queued failures are consumed one per `send()` call before any message
/// is accepted.
pub struct MockMailer {
    sent: Arc<Mutex<Vec<SentMail>>>,
    failures: Arc<Mutex<VecDeque<String>>>,
}

impl MockMailer {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            failures: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Make the next `send()` fail with `message`.
    pub async fn fail_next(&self, message: impl Into<String>) {
        self.failures.lock().await.push_back(message.into());
    }

    /// All messages accepted so far.
    pub async fn sent_messages(&self) -> Vec<SentMail> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }
}

impl Default for MockMailer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockMailer {
    fn name(&self) -> &str {
        "mock-mailer"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Mailer
    }

    async fn health_check(&self) -> Result<HealthStatus, GazetteError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl MailerAdapter for MockMailer {
    async fn send(
        &self,
        recipients: &[String],
        subject: &str,
        html_body: &str,
    ) -> Result<(), GazetteError> {
        if let Some(message) = self.failures.lock().await.pop_front() {
            return Err(GazetteError::Email {
                message,
                source: None,
            });
        }
        self.sent.lock().await.push(SentMail {
            recipients: recipients.to_vec(),
            subject: subject.to_string(),
            html_body: html_body.to_string(),
        });
        Ok(())
    }
}
