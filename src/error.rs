// File: src/error.rs
//! Typed errors for the builder, the oracle adapters, persistence and config.

use std::path::PathBuf;
use thiserror::Error;

/// Failures of the linguistic annotation capability.
#[derive(Debug, Error)]
pub enum OracleError {
    /// The oracle could not be initialised or holds no annotations.
    #[error("linguistic oracle unavailable: {reason}")]
    Unavailable { reason: String },

    /// The oracle has no annotation for the requested text.
    #[error("no annotation for text: {preview}")]
    Unannotated { preview: String },

    /// A CoNLL-U line could not be parsed.
    #[error("malformed annotation at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("failed to read annotations from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Reasons the offline builder stops before writing a model.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("cannot build without a linguistic oracle: {0}")]
    OracleUnavailable(#[source] OracleError),

    #[error("corpus is empty, nothing to extract")]
    EmptyCorpus,

    #[error("no subject-verb-object triples extracted from {texts} texts")]
    NoTriples { texts: usize },

    #[error("no verb equivalences at or above threshold {threshold} among {verbs} verbs")]
    NoEquivalences { threshold: f64, verbs: usize },
}

/// Errors writing or reading persisted artifacts.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot encoding failed: {0}")]
    Snapshot(#[from] bincode::Error),
}

impl PersistenceError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io { path: path.to_path_buf(), source }
    }
}

/// Invalid or unreadable configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("{field} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}
