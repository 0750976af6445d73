// SPDX-FileCopyrightText: 2026 Gazette Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mailer adapter trait for delivering the consolidated newsletter.

use async_trait::async_trait;

use crate::error::GazetteError;
use crate::traits::adapter::PluginAdapter;

/// Adapter for email delivery.
///
/// The transport mechanics (SMTP, MIME) live behind this boundary; callers
/// only learn whether delivery succeeded.
#[async_trait]
pub trait MailerAdapter: PluginAdapter {
    async fn send(
        &self,
        recipients: &[String],
        subject: &str,
        html_body: &str,
    ) -> Result<(), GazetteError>;
}
