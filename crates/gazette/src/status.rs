// SPDX-FileCopyrightText: 2026 Gazette Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `gazette status` command implementation.
//!
//! Polls the running gateway once for a job and prints its topic states,
//! overall progress and current banner. Falls back gracefully when the
//! gateway is not running.

use std::io::IsTerminal;
use std::time::Duration;

use serde::Deserialize;

use gazette_config::model::GazetteConfig;
use gazette_core::GazetteError;

/// Subset of the gateway's status report needed for display.
#[derive(Debug, Deserialize)]
struct JobStatus {
    job_id: String,
    progress: u8,
    ready: bool,
    approved: bool,
    notice: NoticeView,
    topics: Vec<TopicView>,
}

#[derive(Debug, Deserialize)]
struct NoticeView {
    message: String,
    level: String,
}

#[derive(Debug, Deserialize)]
struct TopicView {
    topic: String,
    state: String,
    message: String,
}

/// Run the `gazette status` command.
///
/// With `--json` the gateway's report is printed verbatim. With `--plain`,
/// or when stdout is not a TTY, colors are disabled.
pub async fn run_status(
    config: &GazetteConfig,
    job_id: &str,
    json: bool,
    plain: bool,
) -> Result<(), GazetteError> {
    let host = &config.server.host;
    let port = config.server.port;
    let url = format!("http://{host}:{port}/v1/jobs/{job_id}");

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(3))
        .build()
        .map_err(|e| GazetteError::Internal(format!("failed to create HTTP client: {e}")))?;

    let mut request = client.get(&url);
    if let Some(token) = &config.server.bearer_token {
        request = request.bearer_auth(token);
    }

    let response = match request.send().await {
        Ok(response) => response,
        Err(_) => {
            print_offline(host, port, !plain && std::io::stdout().is_terminal());
            return Ok(());
        }
    };

    if response.status() == reqwest::StatusCode::NOT_FOUND {
        return Err(GazetteError::JobNotFound {
            job_id: job_id.to_string(),
        });
    }
    if !response.status().is_success() {
        return Err(GazetteError::Internal(format!(
            "gateway answered {}",
            response.status()
        )));
    }

    let body = response
        .text()
        .await
        .map_err(|e| GazetteError::Internal(format!("failed to read status response: {e}")))?;

    if json {
        println!("{body}");
        return Ok(());
    }

    let status: JobStatus = serde_json::from_str(&body)
        .map_err(|e| GazetteError::Internal(format!("failed to parse status response: {e}")))?;
    let use_color = !plain && std::io::stdout().is_terminal();
    print!("{}", render_status(&status, use_color));
    Ok(())
}

fn state_marker(state: &str, use_color: bool) -> String {
    let plain = match state {
        "done" => "[OK]",
        "failed" => "[FAIL]",
        "missing" => "[MISS]",
        "running" => "[..]",
        _ => "[  ]",
    };
    if !use_color {
        return plain.to_string();
    }
    use colored::Colorize;
    match state {
        "done" => "✓".green().to_string(),
        "failed" => "✗".red().to_string(),
        "missing" => "!".yellow().to_string(),
        "running" => "●".cyan().to_string(),
        _ => "○".dimmed().to_string(),
    }
}

fn render_status(status: &JobStatus, use_color: bool) -> String {
    let mut out = String::new();
    out.push('\n');
    out.push_str(&format!("  gazette job {}\n", status.job_id));
    out.push_str(&format!("  {}\n", "-".repeat(35)));

    let width = status.topics.iter().map(|t| t.topic.len()).max().unwrap_or(0);
    for topic in &status.topics {
        out.push_str(&format!(
            "    {} {:<width$}  {}\n",
            state_marker(&topic.state, use_color),
            topic.topic,
            topic.message
        ));
    }
    out.push('\n');

    let stage = match (status.ready, status.approved) {
        (true, true) => "approved",
        (true, false) => "ready for review",
        _ => "generating",
    };
    out.push_str(&format!("    Progress: {}% ({stage})\n", status.progress));

    let notice = if use_color {
        use colored::Colorize;
        match status.notice.level.as_str() {
            "success" => status.notice.message.green().to_string(),
            "warning" => status.notice.message.yellow().to_string(),
            "danger" => status.notice.message.red().to_string(),
            _ => status.notice.message.clone(),
        }
    } else {
        format!("[{}] {}", status.notice.level, status.notice.message)
    };
    out.push_str(&format!("    Notice:   {notice}\n\n"));
    out
}

/// Print offline status with optional colors.
fn print_offline(host: &str, port: u16, use_color: bool) {
    println!();
    println!("  gazette status");
    println!("  {}", "-".repeat(35));

    if use_color {
        use colored::Colorize;
        println!("    Gateway:  {} {}", "✗".red(), "not running".red());
    } else {
        println!("    Gateway:  [FAIL] not running");
    }

    println!("    Endpoint: http://{host}:{port}");
    println!();
    println!("  Start with: gazette serve");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> JobStatus {
        serde_json::from_str(
            r#"{
                "job_id": "abc123",
                "progress": 47,
                "ready": false,
                "approved": false,
                "notice": {"message": "Research in progress (47% complete).", "level": "info"},
                "topics": [
                    {"topic": "it_hacks", "state": "done", "message": "Finished.", "started_at": null, "ended_at": null},
                    {"topic": "tech_trends", "state": "running", "message": "Generating Tech Trends", "started_at": null, "ended_at": null}
                ],
                "send_history": []
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn plain_rendering_lists_topics_and_notice() {
        let text = render_status(&sample(), false);
        assert!(text.contains("gazette job abc123"));
        assert!(text.contains("[OK] it_hacks     Finished."));
        assert!(text.contains("[..] tech_trends  Generating Tech Trends"));
        assert!(text.contains("Progress: 47% (generating)"));
        assert!(text.contains("[info] Research in progress (47% complete)."));
    }

    #[test]
    fn unknown_states_render_as_queued() {
        assert_eq!(state_marker("queued", false), "[  ]");
        assert_eq!(state_marker("missing", false), "[MISS]");
    }
}
