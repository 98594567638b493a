//! PAK archive entry metadata.

use veles_common::Fingerprint;

use crate::format::{CompressionMethod, EntryRawV2, EntryRawV4};

/// An entry (file) within a PAK archive.
///
/// This is metadata only; the file's original path is not stored in the
/// archive, just its [`Fingerprint`]. Use [`PakArchive::read_entry`] to get
/// the decompressed contents.
///
/// [`PakArchive::read_entry`]: crate::PakArchive::read_entry
#[derive(Debug, Clone, Copy)]
pub struct PakEntry {
    fingerprint: Fingerprint,
    offset: u64,
    stored_size: u64,
    raw_size: u64,
    compression_tag: u8,
    encryption_tag: u8,
}

impl PakEntry {
    /// The entry's path fingerprint.
    #[inline]
    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    /// Absolute payload offset within the archive.
    #[inline]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Stored (possibly compressed) payload size in bytes.
    #[inline]
    pub fn stored_size(&self) -> u64 {
        self.stored_size
    }

    /// Decompressed payload size in bytes.
    #[inline]
    pub fn raw_size(&self) -> u64 {
        self.raw_size
    }

    /// Raw compression tag as stored in the entry table.
    #[inline]
    pub fn compression_tag(&self) -> u8 {
        self.compression_tag
    }

    /// Compression method, or the unknown raw tag.
    #[inline]
    pub fn method(&self) -> Result<CompressionMethod, u8> {
        CompressionMethod::try_from(self.compression_tag)
    }

    /// Whether the payload is encrypted.
    #[inline]
    pub fn is_encrypted(&self) -> bool {
        self.encryption_tag != 0
    }

    /// Number of bytes to read from the archive for this entry.
    ///
    /// Stored entries record their size in `raw_size`; `stored_size` may be
    /// zero for them, so the read length depends on the method.
    #[inline]
    pub fn read_len(&self) -> u64 {
        if self.compression_tag == CompressionMethod::Store as u8 {
            self.raw_size
        } else {
            self.stored_size
        }
    }
}

impl From<&EntryRawV4> for PakEntry {
    fn from(raw: &EntryRawV4) -> Self {
        Self {
            fingerprint: Fingerprint::from_halves(raw.hash_upper, raw.hash_lower),
            offset: raw.offset as u64,
            stored_size: raw.stored_size as u64,
            raw_size: raw.raw_size as u64,
            compression_tag: raw.compression_tag(),
            encryption_tag: raw.encryption_tag(),
        }
    }
}

impl From<&EntryRawV2> for PakEntry {
    fn from(raw: &EntryRawV2) -> Self {
        Self {
            fingerprint: Fingerprint::from_halves(raw.hash_upper, raw.hash_lower),
            offset: raw.offset as u64,
            stored_size: raw.stored_size as u64,
            // v2 has no separate raw size; entries are stored uncompressed.
            raw_size: raw.stored_size as u64,
            compression_tag: CompressionMethod::Store as u8,
            encryption_tag: 0,
        }
    }
}
