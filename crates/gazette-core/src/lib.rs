// SPDX-FileCopyrightText: 2026 Gazette Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Gazette newsletter service.
//!
//! This crate provides the error taxonomy, the identifier and state types
//! shared by every crate, and the adapter traits behind which the generation
//! pipeline and the mail transport live.

pub mod error;
pub mod traits;
pub mod types;

pub use error::GazetteError;
pub use types::{
    AdapterType, HealthStatus, JobId, PipelineOutput, TopicDefinition, TopicEvent, TopicId,
    TopicState,
};

pub use traits::{MailerAdapter, PipelineAdapter, PluginAdapter, TopicReporter};
