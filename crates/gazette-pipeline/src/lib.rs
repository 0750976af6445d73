// SPDX-FileCopyrightText: 2026 Gazette Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Newsletter generation pipeline for Gazette.
//!
//! [`CommandPipeline`] runs an external generator once per topic and then
//! merges the per-topic documents into one newsletter via [`consolidate`].

pub mod command;
pub mod consolidate;

pub use command::CommandPipeline;
pub use consolidate::{consolidate, extract_body, newsletter_path, topic_output_path};
