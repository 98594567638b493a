//! Error types for the PAK crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when working with PAK archives.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] veles_common::Error),

    /// Archive file does not exist or cannot be opened.
    #[error("archive not found or unreadable: {0}")]
    MissingArchive(PathBuf),

    /// Invalid PAK magic bytes.
    #[error("invalid PAK magic: expected {expected:#010x}, got {actual:#010x}")]
    InvalidMagic { expected: u32, actual: u32 },

    /// Unsupported PAK version.
    #[error("unsupported PAK version {major}.{minor}")]
    UnsupportedVersion { major: u8, minor: u8 },

    /// Entry table shorter than the header's entry count requires.
    #[error("truncated entry table: expected {expected} bytes, got {actual}")]
    TruncatedTable { expected: usize, actual: usize },

    /// The archive's entry table is encrypted (feature flags set).
    #[error("encrypted PAK entry table is not supported")]
    EncryptedTableUnsupported,

    /// The entry's payload is encrypted.
    #[error("encrypted PAK entry payload is not supported")]
    EncryptedEntry,

    /// Entry data extends past the end of the archive.
    #[error("truncated read at offset {offset}: needed {needed} bytes, {available} available")]
    TruncatedRead {
        offset: u64,
        needed: u64,
        available: u64,
    },

    /// Unsupported compression tag.
    #[error("unsupported compression tag: {0}")]
    UnsupportedCompression(u8),

    /// Decompression failed.
    #[error("decompression error: {0}")]
    Decompression(String),

    /// Decompressed size does not match the declared raw size.
    #[error("corrupt payload: expected {expected} bytes, got {actual}")]
    CorruptPayload { expected: u64, actual: u64 },
}

/// Result type for PAK operations.
pub type Result<T> = std::result::Result<T, Error>;
