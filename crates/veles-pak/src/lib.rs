//! PAK archive reader and writer for RE-Engine game files.
//!
//! The "KPKA" PAK format packages game assets keyed by a 64-bit path
//! fingerprint instead of a file name. It supports:
//!
//! - Container versions 2.0, 4.0, and 4.1
//! - DEFLATE compression (tag 1, zlib-wrapped or raw)
//! - Zstandard compression (tag 2)
//! - Feature-flagged encrypted tables (detected and rejected)
//!
//! Archives are memory-mapped; the entry table is parsed eagerly and
//! payload reads are zero-copy slices until decompression.
//!
//! # Example
//!
//! ```no_run
//! use veles_pak::PakArchive;
//!
//! let archive = PakArchive::open("re_chunk_000.pak")?;
//! for entry in archive.iter() {
//!     println!("{}: {} bytes", entry.fingerprint(), entry.raw_size());
//! }
//! # Ok::<(), veles_pak::Error>(())
//! ```

mod archive;
mod decompress;
mod entry;
mod error;
mod writer;

pub mod format;
pub mod locate;

pub use archive::PakArchive;
pub use entry::PakEntry;
pub use error::{Error, Result};
pub use format::CompressionMethod;
pub use writer::PakWriter;
