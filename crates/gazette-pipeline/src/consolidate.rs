// SPDX-FileCopyrightText: 2026 Gazette Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Merge per-topic documents into the single newsletter.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use gazette_core::{GazetteError, TopicDefinition, TopicReporter, TopicState};

static BODY: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?is)<body[^>]*>(.*?)</body>").ok());

/// Inner content of `<body>`, or the whole document when there is none.
pub fn extract_body(html: &str) -> &str {
    BODY.as_ref()
        .and_then(|re| re.captures(html))
        .and_then(|caps| caps.get(1))
        .map_or(html, |m| m.as_str())
        .trim()
}

/// Per-topic document path: `{dir}/{slug}_{month}.html`.
pub fn topic_output_path(dir: &Path, topic: &TopicDefinition, month: &str) -> PathBuf {
    dir.join(format!("{}_{month}.html", topic.slug))
}

/// Consolidated document path: `{dir}/newsletter_email_{month}.html`.
pub fn newsletter_path(dir: &Path, month: &str) -> PathBuf {
    dir.join(format!("newsletter_email_{month}.html"))
}

/// Read each topic's document, report absent ones as `missing`, and write
/// the combined newsletter.
pub async fn consolidate(
    topics: &[TopicDefinition],
    dir: &Path,
    month: &str,
    title: &str,
    reporter: &TopicReporter,
) -> Result<PathBuf, GazetteError> {
    let mut sections = String::new();
    for topic in topics {
        let path = topic_output_path(dir, topic, month);
        match tokio::fs::read_to_string(&path).await {
            Ok(html) => {
                sections.push_str(&format!("<hr><h2>{}</h2>", topic.label));
                sections.push_str(extract_body(&html));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(topic = %topic.slug, path = %path.display(), "topic document missing");
                reporter.report(
                    &topic.slug,
                    TopicState::Missing,
                    "File not found during consolidation",
                );
            }
            Err(e) => return Err(GazetteError::storage(e)),
        }
    }

    let document = format!(
        "<!doctype html><html><head><meta charset='utf-8'>\
         <meta name='viewport' content='width=device-width'>\
         <title>{title}</title></head><body><h1>{title}</h1>\
         <p>Here are this month's highlights across all topics.</p>{sections}</body></html>"
    );
    let output = newsletter_path(dir, month);
    tokio::fs::write(&output, document)
        .await
        .map_err(GazetteError::storage)?;
    debug!(path = %output.display(), "newsletter consolidated");
    Ok(output)
}
