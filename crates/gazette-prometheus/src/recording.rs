// SPDX-FileCopyrightText: 2026 Gazette Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade so any recorder (Prometheus, statsd, etc.)
//! can collect these metrics.

use metrics::{describe_counter, describe_gauge, describe_histogram};

/// Register all Gazette metric descriptions.
///
/// Called once at startup after the recorder is installed.
pub fn register_metrics() {
    describe_counter!("gazette_jobs_created_total", "Newsletter runs started");
    describe_counter!(
        "gazette_jobs_finished_total",
        "Newsletter runs finished, by outcome"
    );
    describe_counter!(
        "gazette_topic_transitions_total",
        "Topic status reports applied, by new state"
    );
    describe_counter!(
        "gazette_email_attempts_total",
        "Email send attempts, by outcome"
    );
    describe_gauge!("gazette_active_jobs", "Runs whose worker has not finished");
    describe_histogram!(
        "gazette_topic_duration_seconds",
        "Wall-clock time from a topic starting to finishing"
    );
}

/// Record a started run.
pub fn record_job_created() {
    metrics::counter!("gazette_jobs_created_total").increment(1);
}

/// Record a finished run (`success` or `failure`).
pub fn record_job_finished(outcome: &str) {
    metrics::counter!("gazette_jobs_finished_total", "outcome" => outcome.to_string()).increment(1);
}

/// Record a topic status transition.
pub fn record_topic_transition(state: &str) {
    metrics::counter!("gazette_topic_transitions_total", "state" => state.to_string())
        .increment(1);
}

/// Record an email attempt (`success`, `failed` or `blocked`).
pub fn record_email_attempt(outcome: &str) {
    metrics::counter!("gazette_email_attempts_total", "outcome" => outcome.to_string())
        .increment(1);
}

/// Set the number of runs in flight.
pub fn set_active_jobs(count: f64) {
    metrics::gauge!("gazette_active_jobs").set(count);
}

/// Record how long a topic took.
pub fn record_topic_duration(seconds: f64) {
    metrics::histogram!("gazette_topic_duration_seconds").record(seconds);
}
