// SPDX-FileCopyrightText: 2026 Gazette Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pipeline that shells out to an external research crew per topic.
//!
//! The configured argv is a template: `{slug}`, `{label}` and `{output}` are
//! substituted in every argument, and the same values are exported as
//! `TOPIC_SLUG`, `TOPIC_LABEL` and `OUTPUT_PATH`. The command is expected to
//! write an HTML document to the output path and exit zero.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};

use gazette_config::GazetteConfig;
use gazette_core::traits::adapter::PluginAdapter;
use gazette_core::traits::pipeline::{PipelineAdapter, TopicReporter};
use gazette_core::types::{AdapterType, HealthStatus, PipelineOutput, TopicDefinition, TopicState};
use gazette_core::GazetteError;

use crate::consolidate::{consolidate, topic_output_path};

/// Runs one external command per topic, then consolidates.
pub struct CommandPipeline {
    command: Vec<String>,
    output_dir: PathBuf,
    title_prefix: String,
}

impl CommandPipeline {
    pub fn new(command: Vec<String>, output_dir: impl Into<PathBuf>, title_prefix: impl Into<String>) -> Self {
        Self {
            command,
            output_dir: output_dir.into(),
            title_prefix: title_prefix.into(),
        }
    }

    pub fn from_config(config: &GazetteConfig) -> Self {
        Self::new(
            config.pipeline.command.clone(),
            &config.pipeline.output_dir,
            config.email.subject_prefix.clone(),
        )
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// The argv for one topic with placeholders filled in.
    pub fn render_argv(&self, topic: &TopicDefinition, output: &Path) -> Vec<String> {
        let output = output.display().to_string();
        self.command
            .iter()
            .map(|arg| {
                arg.replace("{slug}", topic.slug.as_str())
                    .replace("{label}", &topic.label)
                    .replace("{output}", &output)
            })
            .collect()
    }

    async fn run_topic(&self, topic: &TopicDefinition, output: &Path) -> Result<(), GazetteError> {
        let argv = self.render_argv(topic, output);
        let Some((program, args)) = argv.split_first() else {
            return Err(GazetteError::Config("pipeline.command is empty".to_string()));
        };
        debug!(topic = %topic.slug, program = %program, "launching pipeline command");

        let result = tokio::process::Command::new(program)
            .args(args)
            .env("TOPIC_SLUG", topic.slug.as_str())
            .env("TOPIC_LABEL", &topic.label)
            .env("OUTPUT_PATH", output)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| GazetteError::Pipeline {
                message: format!("failed to launch `{program}` for {}: {e}", topic.label),
            })?;

        if result.status.success() {
            return Ok(());
        }
        let code = result.status.code().unwrap_or(-1);
        let stderr = String::from_utf8_lossy(&result.stderr);
        let last_line = stderr.lines().rev().find(|l| !l.trim().is_empty()).unwrap_or("");
        let mut message = format!("{} generation exited with code {code}", topic.label);
        if !last_line.is_empty() {
            message.push_str(": ");
            message.push_str(last_line.trim());
        }
        Err(GazetteError::Pipeline { message })
    }
}

#[async_trait]
impl PluginAdapter for CommandPipeline {
    fn name(&self) -> &str {
        "command"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Pipeline
    }

    async fn health_check(&self) -> Result<HealthStatus, GazetteError> {
        if self.command.is_empty() {
            return Ok(HealthStatus::Unhealthy("no pipeline command configured".to_string()));
        }
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl PipelineAdapter for CommandPipeline {
    async fn run(
        &self,
        edition: &str,
        topics: &[TopicDefinition],
        reporter: TopicReporter,
    ) -> Result<PipelineOutput, GazetteError> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(GazetteError::storage)?;

        let mut topic_outputs = BTreeMap::new();
        for topic in topics {
            reporter.report(&topic.slug, TopicState::Running, format!("Generating {}", topic.label));
            let output = topic_output_path(&self.output_dir, topic, edition);
            self.run_topic(topic, &output).await?;
            reporter.report(&topic.slug, TopicState::Done, format!("Generated {}", output.display()));
            topic_outputs.insert(topic.slug.clone(), output);
        }

        let title = format!("{} - {edition}", self.title_prefix);
        let artifact_path =
            consolidate(topics, &self.output_dir, edition, &title, &reporter).await?;
        info!(artifact = %artifact_path.display(), topics = topics.len(), "newsletter generated");

        Ok(PipelineOutput {
            artifact_path,
            topic_outputs,
        })
    }
}

#[cfg(test)]
mod tests {
    use gazette_core::{TopicEvent, TopicId};
    use tokio::sync::mpsc;

    use super::*;

    fn topic(slug: &str, label: &str) -> TopicDefinition {
        TopicDefinition {
            slug: TopicId::from(slug),
            label: label.to_string(),
            icon: String::new(),
        }
    }

    fn sh(script: &str) -> Vec<String> {
        vec!["sh".to_string(), "-c".to_string(), script.to_string()]
    }

    async fn collect(mut rx: mpsc::UnboundedReceiver<TopicEvent>) -> Vec<(String, TopicState)> {
        let mut events = Vec::new();
        while let Some(e) = rx.recv().await {
            events.push((e.topic.0, e.state));
        }
        events
    }

    #[test]
    fn placeholders_are_substituted() {
        let pipeline = CommandPipeline::new(
            vec![
                "crew".into(),
                "--topic={slug}".into(),
                "{label}".into(),
                "{output}".into(),
            ],
            "out",
            "Tech Newsletter",
        );
        let argv = pipeline.render_argv(&topic("it_hacks", "IT Hacks"), Path::new("out/it_hacks_May.html"));
        assert_eq!(
            argv,
            vec!["crew", "--topic=it_hacks", "IT Hacks", "out/it_hacks_May.html"]
        );
    }

    #[tokio::test]
    async fn runs_each_topic_and_consolidates() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = CommandPipeline::new(
            sh(r#"printf '<html><body><p>%s</p></body></html>' "$TOPIC_LABEL" > "$OUTPUT_PATH""#),
            dir.path(),
            "Tech Newsletter",
        );
        let topics = vec![topic("it_hacks", "IT Hacks"), topic("tech_trends", "Tech Trends")];

        let (tx, rx) = mpsc::unbounded_channel();
        let output = pipeline
            .run("April", &topics, TopicReporter::new(tx))
            .await
            .unwrap();

        let html = tokio::fs::read_to_string(&output.artifact_path).await.unwrap();
        assert!(html.contains("Tech Newsletter - April"));
        assert!(html.contains("<h2>IT Hacks</h2><p>IT Hacks</p>"));
        assert!(html.contains("<h2>Tech Trends</h2><p>Tech Trends</p>"));
        assert_eq!(
            output.topic_outputs[&TopicId::from("it_hacks")],
            dir.path().join("it_hacks_April.html")
        );
        assert_eq!(output.artifact_path, dir.path().join("newsletter_email_April.html"));

        assert_eq!(
            collect(rx).await,
            vec![
                ("it_hacks".to_string(), TopicState::Running),
                ("it_hacks".to_string(), TopicState::Done),
                ("tech_trends".to_string(), TopicState::Running),
                ("tech_trends".to_string(), TopicState::Done),
            ]
        );
    }

    #[tokio::test]
    async fn topic_without_document_is_reported_missing() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = CommandPipeline::new(
            sh(r#"[ "$TOPIC_SLUG" = "ai_at_work" ] || echo '<p>ok</p>' > "$OUTPUT_PATH""#),
            dir.path(),
            "Tech Newsletter",
        );
        let topics = vec![topic("ai_at_work", "AI at Work"), topic("it_hacks", "IT Hacks")];

        let (tx, rx) = mpsc::unbounded_channel();
        pipeline
            .run("May", &topics, TopicReporter::new(tx))
            .await
            .unwrap();

        let events = collect(rx).await;
        assert_eq!(
            events.last(),
            Some(&("ai_at_work".to_string(), TopicState::Missing))
        );
    }

    #[tokio::test]
    async fn non_zero_exit_fails_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = CommandPipeline::new(
            sh("echo 'quota exceeded' >&2; exit 3"),
            dir.path(),
            "Tech Newsletter",
        );
        let (tx, rx) = mpsc::unbounded_channel();
        let err = pipeline
            .run("May", &[topic("it_hacks", "IT Hacks")], TopicReporter::new(tx))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "IT Hacks generation exited with code 3: quota exceeded"
        );
        assert_eq!(collect(rx).await, vec![("it_hacks".to_string(), TopicState::Running)]);
    }

    #[tokio::test]
    async fn health_reflects_command_presence() {
        let empty = CommandPipeline::new(Vec::new(), "out", "x");
        assert!(matches!(
            empty.health_check().await.unwrap(),
            HealthStatus::Unhealthy(_)
        ));
    }
}
