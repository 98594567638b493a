//! On-disk PAK structures.
//!
//! All values are little-endian. The container is "KPKA": a 16-byte header
//! followed immediately by a fixed-size entry table, then raw entry
//! payloads at the offsets the table records. Entries carry no file names,
//! only a 64-bit path fingerprint split into two 32-bit halves.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// PAK magic, "KPKA" as a little-endian u32.
pub const MAGIC: u32 = 0x414B_504B;

/// Supported (major, minor) container versions.
pub const SUPPORTED_VERSIONS: [(u8, u8); 3] = [(4, 0), (4, 1), (2, 0)];

/// PAK file header.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C, packed)]
pub struct PakHeader {
    /// Magic bytes, must equal [`MAGIC`].
    pub magic: u32,
    /// Major version (4 or 2).
    pub major: u8,
    /// Minor version.
    pub minor: u8,
    /// Feature flags; nonzero means the entry table is encrypted.
    pub feature_flags: u16,
    /// Number of entries in the table.
    pub entry_count: u32,
    /// Archive fingerprint (unused by the index).
    pub fingerprint: u32,
}

impl PakHeader {
    /// Header size on disk.
    pub const SIZE: usize = 16;

    /// Whether this header's version is one the reader understands.
    pub fn is_supported_version(&self) -> bool {
        SUPPORTED_VERSIONS.contains(&(self.major, self.minor))
    }

    /// Entry record size for this version.
    pub fn entry_size(&self) -> usize {
        if self.major == 4 {
            EntryRawV4::SIZE
        } else {
            EntryRawV2::SIZE
        }
    }
}

/// Version 4 entry record (48 bytes).
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C, packed)]
pub struct EntryRawV4 {
    /// Hash of the lower-cased path.
    pub hash_lower: u32,
    /// Hash of the upper-cased path.
    pub hash_upper: u32,
    /// Absolute payload offset.
    pub offset: i64,
    /// Stored (possibly compressed) payload size.
    pub stored_size: i64,
    /// Decompressed payload size.
    pub raw_size: i64,
    /// Packed attributes, see [`EntryRawV4::compression_tag`].
    pub attributes: i64,
    /// Payload checksum (not verified by this reader).
    pub checksum: i64,
}

impl EntryRawV4 {
    /// Record size on disk.
    pub const SIZE: usize = 48;

    /// Compression tag, low nibble of the attributes.
    #[inline]
    pub fn compression_tag(&self) -> u8 {
        (self.attributes & 0xF) as u8
    }

    /// Encryption tag, bits 16..24 of the attributes.
    #[inline]
    pub fn encryption_tag(&self) -> u8 {
        ((self.attributes >> 16) & 0xFF) as u8
    }
}

/// Version 2 entry record (24 bytes). Entries are always stored
/// uncompressed; there is no separate raw size.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C, packed)]
pub struct EntryRawV2 {
    /// Absolute payload offset.
    pub offset: i64,
    /// Payload size.
    pub stored_size: i64,
    /// Hash of the upper-cased path.
    pub hash_upper: u32,
    /// Hash of the lower-cased path.
    pub hash_lower: u32,
}

impl EntryRawV2 {
    /// Record size on disk.
    pub const SIZE: usize = 24;
}

/// Compression methods used in PAK archives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CompressionMethod {
    /// No compression (stored).
    Store = 0,
    /// DEFLATE compression (zlib-wrapped, some archives use raw streams).
    Deflate = 1,
    /// Zstandard compression.
    Zstd = 2,
}

impl TryFrom<u8> for CompressionMethod {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Store),
            1 => Ok(Self::Deflate),
            2 => Ok(Self::Zstd),
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_sizes() {
        assert_eq!(std::mem::size_of::<PakHeader>(), PakHeader::SIZE);
        assert_eq!(std::mem::size_of::<EntryRawV4>(), EntryRawV4::SIZE);
        assert_eq!(std::mem::size_of::<EntryRawV2>(), EntryRawV2::SIZE);
    }

    #[test]
    fn test_attribute_unpacking() {
        let entry = EntryRawV4 {
            hash_lower: 0,
            hash_upper: 0,
            offset: 0,
            stored_size: 0,
            raw_size: 0,
            attributes: (3 << 16) | 0x2,
            checksum: 0,
        };
        assert_eq!(entry.compression_tag(), 2);
        assert_eq!(entry.encryption_tag(), 3);
    }
}
