//! Error types for the index crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while indexing, resolving, or extracting.
#[derive(Debug, Error)]
pub enum Error {
    /// PAK container error.
    #[error(transparent)]
    Pak(#[from] veles_pak::Error),

    /// I/O error outside an archive (output writes, directory creation).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A candidate list file could not be read.
    #[error("failed to read candidate list {path}: {source}")]
    CandidateList {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A resolved name would write outside the output directory.
    #[error("refusing to write outside the output tree: {0}")]
    UnsafeOutputPath(String),
}

/// Result type for index operations.
pub type Result<T> = std::result::Result<T, Error>;
