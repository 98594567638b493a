//! PAK archive reader.
//!
//! Memory-maps the archive and parses the fixed-size entry table up front;
//! payload reads are bounds-checked slices of the map, so concurrent reads
//! from multiple threads need no locking.

use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use veles_common::BinaryReader;

use crate::decompress;
use crate::entry::PakEntry;
use crate::format::{CompressionMethod, EntryRawV2, EntryRawV4, PakHeader, MAGIC};
use crate::{Error, Result};

/// A memory-mapped PAK archive with its parsed entry table.
pub struct PakArchive {
    mmap: Mmap,
    path: PathBuf,
    header: PakHeader,
    entries: Vec<PakEntry>,
}

impl PakArchive {
    /// Open a PAK archive and parse its entry table.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound | ErrorKind::PermissionDenied => {
                Error::MissingArchive(path.to_path_buf())
            }
            _ => Error::Io(e),
        })?;
        let mmap = unsafe { Mmap::map(&file)? };

        let (header, entries) = Self::parse_table(&mmap)?;

        Ok(Self {
            mmap,
            path: path.to_path_buf(),
            header,
            entries,
        })
    }

    /// The archive's filesystem path.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The parsed header.
    #[inline]
    pub fn header(&self) -> &PakHeader {
        &self.header
    }

    /// Number of entries in the table.
    #[inline]
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Iterate over the entry table.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &PakEntry> + '_ {
        self.entries.iter()
    }

    /// Get an entry by table index.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&PakEntry> {
        self.entries.get(index)
    }

    /// Read and decompress an entry's payload.
    pub fn read_entry(&self, entry: &PakEntry) -> Result<Vec<u8>> {
        if entry.is_encrypted() {
            return Err(Error::EncryptedEntry);
        }

        let method = entry
            .method()
            .map_err(Error::UnsupportedCompression)?;

        let stored = self.payload_slice(entry.offset(), entry.read_len())?;

        let data = match method {
            CompressionMethod::Store => stored.to_vec(),
            CompressionMethod::Deflate => {
                decompress::decompress_deflate_sized(stored, entry.raw_size() as usize)?
            }
            CompressionMethod::Zstd => {
                decompress::decompress_zstd_sized(stored, entry.raw_size() as usize)?
            }
        };

        if data.len() as u64 != entry.raw_size() {
            return Err(Error::CorruptPayload {
                expected: entry.raw_size(),
                actual: data.len() as u64,
            });
        }

        Ok(data)
    }

    fn payload_slice(&self, offset: u64, len: u64) -> Result<&[u8]> {
        let end = offset.checked_add(len).ok_or(Error::TruncatedRead {
            offset,
            needed: len,
            available: 0,
        })?;
        if end > self.mmap.len() as u64 {
            return Err(Error::TruncatedRead {
                offset,
                needed: len,
                available: (self.mmap.len() as u64).saturating_sub(offset),
            });
        }
        Ok(&self.mmap[offset as usize..end as usize])
    }

    fn parse_table(data: &[u8]) -> Result<(PakHeader, Vec<PakEntry>)> {
        let mut reader = BinaryReader::new(data);

        let header: PakHeader = reader.read_struct().map_err(|_| Error::TruncatedTable {
            expected: PakHeader::SIZE,
            actual: data.len(),
        })?;

        if header.magic != MAGIC {
            return Err(Error::InvalidMagic {
                expected: MAGIC,
                actual: header.magic,
            });
        }
        if !header.is_supported_version() {
            return Err(Error::UnsupportedVersion {
                major: header.major,
                minor: header.minor,
            });
        }
        if header.feature_flags != 0 {
            return Err(Error::EncryptedTableUnsupported);
        }

        let count = header.entry_count as usize;
        let table_size = count * header.entry_size();
        if reader.remaining() < table_size {
            return Err(Error::TruncatedTable {
                expected: table_size,
                actual: reader.remaining(),
            });
        }

        let mut entries = Vec::with_capacity(count);
        if header.major == 4 {
            for _ in 0..count {
                let raw: EntryRawV4 = reader.read_struct()?;
                entries.push(PakEntry::from(&raw));
            }
        } else {
            for _ in 0..count {
                let raw: EntryRawV2 = reader.read_struct()?;
                entries.push(PakEntry::from(&raw));
            }
        }

        Ok((header, entries))
    }
}

impl std::fmt::Debug for PakArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PakArchive")
            .field("path", &self.path)
            .field("version", &(self.header.major, self.header.minor))
            .field("entries", &self.entries.len())
            .finish()
    }
}
