// SPDX-FileCopyrightText: 2026 Gazette Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistent cache of recent per-topic run durations.
//!
//! The cache file is a JSON object mapping a topic slug to an array of
//! durations in seconds, most recent last. It is loaded lazily on first use
//! and rewritten in full after every update. A single mutex covers the load,
//! the in-memory merge, and the write, so concurrent jobs finishing the same
//! topic cannot interleave partial files.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::{debug, warn};

use gazette_config::model::RuntimeConfig;
use gazette_core::{GazetteError, TopicId};

/// Recent duration samples per topic, most recent last.
pub type RuntimeSamples = BTreeMap<TopicId, Vec<f64>>;

/// Bounded, file-backed duration history shared by every job.
#[derive(Debug)]
pub struct RuntimeCache {
    path: PathBuf,
    max_samples: usize,
    samples: Mutex<Option<RuntimeSamples>>,
}

impl RuntimeCache {
    pub fn new(path: impl Into<PathBuf>, max_samples: usize) -> Self {
        Self {
            path: path.into(),
            max_samples: max_samples.max(1),
            samples: Mutex::new(None),
        }
    }

    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self::new(&config.cache_path, config.max_samples)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A copy of every topic's samples.
    pub fn snapshot(&self) -> RuntimeSamples {
        let mut guard = self.samples.lock().unwrap_or_else(PoisonError::into_inner);
        guard
            .get_or_insert_with(|| load(&self.path, self.max_samples))
            .clone()
    }

    /// Samples for a single topic (empty if it has never completed).
    pub fn samples(&self, topic: &TopicId) -> Vec<f64> {
        let mut guard = self.samples.lock().unwrap_or_else(PoisonError::into_inner);
        guard
            .get_or_insert_with(|| load(&self.path, self.max_samples))
            .get(topic)
            .cloned()
            .unwrap_or_default()
    }

    /// Append a duration for `topic`, evicting the oldest beyond the cap,
    /// and rewrite the cache file.
    ///
    /// Non-positive or non-finite durations are ignored.
    pub fn record(&self, topic: &TopicId, seconds: f64) -> Result<(), GazetteError> {
        if !(seconds.is_finite() && seconds > 0.0) {
            debug!(topic = %topic, seconds, "ignoring non-positive duration sample");
            return Ok(());
        }

        let mut guard = self.samples.lock().unwrap_or_else(PoisonError::into_inner);
        let samples = guard.get_or_insert_with(|| load(&self.path, self.max_samples));
        let entry = samples.entry(topic.clone()).or_default();
        entry.push(seconds);
        if entry.len() > self.max_samples {
            let excess = entry.len() - self.max_samples;
            entry.drain(..excess);
        }

        persist(&self.path, samples)
    }
}

fn load(path: &Path, max_samples: usize) -> RuntimeSamples {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return RuntimeSamples::new(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not read runtime cache, starting empty");
            return RuntimeSamples::new();
        }
    };

    let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap_or_default();
    let serde_json::Value::Object(map) = parsed else {
        warn!(path = %path.display(), "runtime cache is not a JSON object, starting empty");
        return RuntimeSamples::new();
    };

    map.into_iter()
        .filter_map(|(topic, value)| {
            let serde_json::Value::Array(values) = value else {
                return None;
            };
            let mut durations: Vec<f64> = values
                .iter()
                .filter_map(serde_json::Value::as_f64)
                .filter(|d| d.is_finite() && *d > 0.0)
                .collect();
            if durations.len() > max_samples {
                durations.drain(..durations.len() - max_samples);
            }
            Some((TopicId(topic), durations))
        })
        .collect()
}

fn persist(path: &Path, samples: &RuntimeSamples) -> Result<(), GazetteError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(GazetteError::storage)?;
    }
    let body = serde_json::to_string_pretty(samples).map_err(GazetteError::storage)?;
    std::fs::write(path, body).map_err(GazetteError::storage)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic(s: &str) -> TopicId {
        TopicId::from(s)
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = RuntimeCache::new(dir.path().join("runtimes.json"), 5);
        assert!(cache.snapshot().is_empty());
        assert!(cache.samples(&topic("it_hacks")).is_empty());
    }

    #[test]
    fn record_evicts_oldest_beyond_cap() {
        let dir = tempfile::tempdir().unwrap();
        let cache = RuntimeCache::new(dir.path().join("runtimes.json"), 3);
        for d in [10.0, 20.0, 30.0, 40.0] {
            cache.record(&topic("tech_trends"), d).unwrap();
        }
        assert_eq!(cache.samples(&topic("tech_trends")), vec![20.0, 30.0, 40.0]);
    }

    #[test]
    fn record_rewrites_file_and_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/runtimes.json");
        let cache = RuntimeCache::new(&path, 5);
        cache.record(&topic("ai_at_work"), 42.5).unwrap();
        cache.record(&topic("it_hacks"), 7.0).unwrap();

        let on_disk: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk["ai_at_work"], serde_json::json!([42.5]));

        let reloaded = RuntimeCache::new(&path, 5);
        assert_eq!(reloaded.samples(&topic("it_hacks")), vec![7.0]);
    }

    #[test]
    fn non_positive_durations_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runtimes.json");
        let cache = RuntimeCache::new(&path, 5);
        cache.record(&topic("a"), 0.0).unwrap();
        cache.record(&topic("a"), -3.0).unwrap();
        cache.record(&topic("a"), f64::NAN).unwrap();
        assert!(cache.snapshot().is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn corrupt_file_is_treated_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runtimes.json");
        std::fs::write(&path, "{not json").unwrap();
        let cache = RuntimeCache::new(&path, 5);
        assert!(cache.snapshot().is_empty());

        std::fs::write(&path, "[1, 2, 3]").unwrap();
        let cache = RuntimeCache::new(&path, 5);
        assert!(cache.snapshot().is_empty());
    }

    #[test]
    fn non_numeric_entries_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runtimes.json");
        std::fs::write(
            &path,
            r#"{"it_hacks": [30, "slow", null, 45.5, -1], "o365_updates": "oops"}"#,
        )
        .unwrap();
        let cache = RuntimeCache::new(&path, 5);
        let snapshot = cache.snapshot();
        assert_eq!(snapshot[&topic("it_hacks")], vec![30.0, 45.5]);
        assert!(!snapshot.contains_key(&topic("o365_updates")));
    }

    #[test]
    fn load_happens_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runtimes.json");
        std::fs::write(&path, r#"{"a": [10]}"#).unwrap();
        let cache = RuntimeCache::new(&path, 5);
        assert_eq!(cache.samples(&topic("a")), vec![10.0]);

        // External edits after the first load are not picked up.
        std::fs::write(&path, r#"{"a": [99]}"#).unwrap();
        assert_eq!(cache.samples(&topic("a")), vec![10.0]);
    }
}
