//! Veles - RE-Engine PAK archive indexing, path resolution, and extraction.
//!
//! This crate provides a unified interface to the Veles library ecosystem
//! for working with fingerprint-keyed game archives.
//!
//! # Crates
//!
//! - [`veles_common`] - Binary reading, errors, and the murmur3 path
//!   fingerprint engine
//! - [`veles_pak`] - PAK container reading and writing
//! - [`veles_index`] - Layered index, dictionary resolution, extraction
//!
//! # Example
//!
//! ```no_run
//! use veles::prelude::*;
//!
//! let archive = PakArchive::open("re_chunk_000.pak")?;
//! let index = ArchiveIndex::merge(std::slice::from_ref(&archive));
//!
//! let candidates = vec!["natives/stm/sound.pck".to_string()];
//! let result = resolve_utf16le(&index, &candidates);
//! println!("{} names recovered", result.updated);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Re-export all sub-crates
pub use veles_common as common;
pub use veles_index as index;
pub use veles_pak as pak;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use veles_common::{fingerprint, hash32, Encoding, Fingerprint};
    pub use veles_index::{
        dictionary, extract::extract, resolve_utf16le, resolve_utf8, ArchiveIndex, CancelToken,
        ExtractOptions, ExtractionReport, IndexEntry, NoProgress, ProgressSink, Selection,
    };
    pub use veles_pak::{locate, CompressionMethod, PakArchive, PakEntry, PakWriter};
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
