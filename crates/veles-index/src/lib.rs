//! Layered archive index, path resolution, and extraction for PAK files.
//!
//! PAK entries are keyed only by a path fingerprint; this crate recovers
//! the human-readable paths and gets the data out:
//!
//! - [`ArchiveIndex`] - one fingerprint-to-entry map merged across archive
//!   layers in priority order (base game first, mods after)
//! - [`resolve`] - bulk-test candidate path dictionaries against the index
//!   to fill in resolved names
//! - [`extract`] - stream selected entries to disk with decompression,
//!   progress, cancellation, and per-item failure isolation
//!
//! # Example
//!
//! ```no_run
//! use veles_index::{dictionary, resolve, ArchiveIndex, Selection};
//! use veles_index::{extract, CancelToken, ExtractOptions, NoProgress};
//!
//! let (layers, failures) = ArchiveIndex::load_layers(&[
//!     "re_chunk_000.pak",
//!     "re_chunk_000.pak.patch_001.pak",
//! ]);
//! assert!(failures.is_empty());
//! let index = ArchiveIndex::merge(&layers);
//!
//! let candidates = dictionary::load_candidates("pak_list.txt")?;
//! let result = resolve::resolve_utf16le(&index, &candidates);
//! println!("resolved {} paths", result.updated);
//!
//! let report = extract::extract(
//!     &index,
//!     &Selection::All,
//!     std::path::Path::new("out"),
//!     &ExtractOptions::default(),
//!     &CancelToken::new(),
//!     &NoProgress,
//! )?;
//! println!("{} extracted, {} failed", report.succeeded, report.failed.len());
//! # Ok::<(), veles_index::Error>(())
//! ```

mod error;
mod index;

pub mod dictionary;
pub mod extract;
pub mod resolve;

pub use error::{Error, Result};
pub use extract::{
    CancelToken, ExtractOptions, ExtractionReport, ItemFailure, NoProgress, ProgressSink,
    Selection,
};
pub use index::{ArchiveIndex, IndexEntry, UNKNOWN_DIR};
pub use resolve::{Resolution, resolve_utf16le, resolve_utf8};
