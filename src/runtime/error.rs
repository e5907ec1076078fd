//! Lookup errors.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to resolve a collection or entry from generated indexes.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("no collection matches `{0}`")]
    UnknownCollection(String),

    #[error("collection `{collection}` has no entry `{entry}`")]
    UnknownEntry { collection: String, entry: String },

    #[error("index of `{0}` is missing or empty, run `lectern build` first")]
    EmptyIndex(String),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid index manifest {path}: {message}")]
    Manifest { path: PathBuf, message: String },
}
