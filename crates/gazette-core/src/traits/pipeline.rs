// SPDX-FileCopyrightText: 2026 Gazette Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pipeline adapter trait for the research -> write -> edit generation run.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::GazetteError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{PipelineOutput, TopicDefinition, TopicEvent, TopicId, TopicState};

/// Sending half of a job's status-event queue.
///
/// Events are consumed in order by the job's tracker. Reports made after the
/// job's worker has stopped listening are dropped.
#[derive(Debug, Clone)]
pub struct TopicReporter {
    tx: mpsc::UnboundedSender<TopicEvent>,
}

impl TopicReporter {
    pub fn new(tx: mpsc::UnboundedSender<TopicEvent>) -> Self {
        Self { tx }
    }

    /// Post a status transition for `topic`.
    pub fn report(&self, topic: &TopicId, state: TopicState, detail: impl Into<String>) {
        let event = TopicEvent {
            topic: topic.clone(),
            state,
            detail: detail.into(),
        };
        if self.tx.send(event).is_err() {
            tracing::debug!(topic = %topic, %state, "status receiver closed, event dropped");
        }
    }
}

/// Adapter that produces the newsletter for a set of topics.
///
/// Implementations run topics sequentially, reporting each transition through
/// the [`TopicReporter`], and return the consolidated artifact location.
/// Any unrecoverable failure is returned as [`GazetteError::Pipeline`].
///
/// `edition` is the month name the run is published under. It names the
/// generated files and titles the consolidated document.
#[async_trait]
pub trait PipelineAdapter: PluginAdapter {
    async fn run(
        &self,
        edition: &str,
        topics: &[TopicDefinition],
        reporter: TopicReporter,
    ) -> Result<PipelineOutput, GazetteError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reporter_preserves_event_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let reporter = TopicReporter::new(tx);
        let topic = TopicId::from("tech_trends");

        reporter.report(&topic, TopicState::Running, "Generating Tech Trends");
        reporter.report(&topic, TopicState::Done, "Generated");
        drop(reporter);

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.state, TopicState::Running);
        assert_eq!(second.state, TopicState::Done);
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn report_after_receiver_dropped_is_silent() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let reporter = TopicReporter::new(tx);
        reporter.report(&TopicId::from("it_hacks"), TopicState::Done, "");
    }
}
