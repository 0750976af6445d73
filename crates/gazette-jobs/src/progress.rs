// SPDX-FileCopyrightText: 2026 Gazette Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Percent-complete estimation from topic states and duration history.
//!
//! A running topic ramps linearly from the floor towards the cap over its
//! expected duration (the mean of recent samples, or a fixed ramp when the
//! topic has no history) and then holds at the cap until it finishes. The job
//! percentage is the truncated unweighted mean over its topics.

use chrono::{DateTime, Utc};

use gazette_config::model::RuntimeConfig;
use gazette_core::TopicState;

use crate::job::TopicStatus;
use crate::runtime::RuntimeSamples;

/// Bounds of the running-topic ramp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressModel {
    pub floor: u8,
    pub cap: u8,
    pub ramp_secs: f64,
}

impl Default for ProgressModel {
    fn default() -> Self {
        Self {
            floor: 5,
            cap: 90,
            ramp_secs: 120.0,
        }
    }
}

impl ProgressModel {
    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self {
            floor: config.floor_percent,
            cap: config.cap_percent,
            ramp_secs: config.ramp_secs,
        }
    }

    /// Progress of a single topic, 0..=100.
    pub fn topic_progress(&self, status: &TopicStatus, samples: &[f64], now: DateTime<Utc>) -> u8 {
        match status.state {
            TopicState::Queued => 0,
            TopicState::Done | TopicState::Failed | TopicState::Missing => 100,
            TopicState::Running => {
                let elapsed = status
                    .started_at
                    .map(|started| (now - started).num_milliseconds().max(0) as f64 / 1000.0)
                    .unwrap_or(0.0);
                let expected = mean(samples).unwrap_or(self.ramp_secs);
                let ratio = if expected > 0.0 {
                    (elapsed / expected).min(1.0)
                } else {
                    1.0
                };
                let span = f64::from(self.cap.saturating_sub(self.floor));
                let pct = f64::from(self.floor) + span * ratio;
                pct.clamp(0.0, 100.0) as u8
            }
        }
    }

    /// Job-level percent complete: 0 with no topics, otherwise the truncated
    /// mean of per-topic progress.
    pub fn percent_complete(
        &self,
        status: &[TopicStatus],
        samples: &RuntimeSamples,
        now: DateTime<Utc>,
    ) -> u8 {
        if status.is_empty() {
            return 0;
        }
        let total: u32 = status
            .iter()
            .map(|s| {
                let history = samples.get(&s.topic).map(Vec::as_slice).unwrap_or(&[]);
                u32::from(self.topic_progress(s, history, now))
            })
            .sum();
        let count = u32::try_from(status.len()).unwrap_or(u32::MAX);
        u8::try_from(total / count).unwrap_or(100)
    }
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        None
    } else {
        Some(samples.iter().sum::<f64>() / samples.len() as f64)
    }
}
