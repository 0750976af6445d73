// SPDX-FileCopyrightText: 2026 Gazette Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Gazette newsletter service.

use thiserror::Error;

/// The primary error type used across all Gazette adapter traits and core operations.
#[derive(Debug, Error)]
pub enum GazetteError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage errors (duration cache file, artifact reads and writes).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The requested job id is unknown to the registry.
    #[error("job not found: {job_id}")]
    JobNotFound { job_id: String },

    /// A run request selected no known topics.
    #[error("invalid topic selection: {0}")]
    InvalidSelection(String),

    /// The job has not reached the ready state (artifact written, no error, all topics done).
    #[error("job {job_id} is not ready")]
    NotReady { job_id: String },

    /// The consolidated artifact is absent or unreadable.
    #[error("artifact missing for job {job_id}")]
    ArtifactMissing { job_id: String },

    /// The generation pipeline failed; the message is shown to users verbatim.
    #[error("{message}")]
    Pipeline { message: String },

    /// Email delivery failed.
    #[error("{message}")]
    Email {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Requested adapter was not found.
    #[error("adapter not found: {adapter_type}/{name}")]
    AdapterNotFound { adapter_type: String, name: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GazetteError {
    /// Shorthand for wrapping an I/O or serialization failure.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        GazetteError::Storage {
            source: Box::new(err),
        }
    }

    /// Returns true for the "resource missing" class of errors.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            GazetteError::JobNotFound { .. } | GazetteError::ArtifactMissing { .. }
        )
    }
}
