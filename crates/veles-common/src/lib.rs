//! Common utilities for Veles.
//!
//! This crate provides the foundational types used across all Veles crates:
//!
//! - [`BinaryReader`] - Zero-copy binary reading from byte slices
//! - [`murmur`] - The path fingerprint hash engine (MurmurHash3 x86_32)
//! - [`Fingerprint`] - 64-bit case-insensitive path identity
//! - Shared error types

mod error;
mod reader;

pub mod murmur;

pub use error::{Error, Result};
pub use murmur::{fingerprint, hash32, normalize_path, Encoding, Fingerprint};
pub use reader::BinaryReader;

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};
