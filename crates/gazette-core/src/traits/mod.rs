// SPDX-FileCopyrightText: 2026 Gazette Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the external collaborators.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod mailer;
pub mod pipeline;

pub use adapter::PluginAdapter;
pub use mailer::MailerAdapter;
pub use pipeline::{PipelineAdapter, TopicReporter};
