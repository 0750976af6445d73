// SPDX-FileCopyrightText: 2026 Gazette Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Gazette integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without an external pipeline or SMTP.
//!
//! # Components
//!
//! - [`MockPipeline`] - Scripted pipeline with failure, missing-topic and gating knobs
//! - [`MockMailer`] - Mail transport that captures messages and replays failures
//! - [`ManualClock`] - Clock that only advances on request
//! - [`TestHarness`] - A fully wired `JobService` over the mocks

pub mod harness;
pub mod mock_mailer;
pub mod mock_pipeline;

pub use gazette_jobs::ManualClock;
pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_mailer::{MockMailer, SentMail};
pub use mock_pipeline::MockPipeline;
