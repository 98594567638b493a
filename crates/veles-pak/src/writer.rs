//! Minimal PAK writer.
//!
//! Produces version 4.0 archives with unencrypted entry tables, which is
//! all the game loader requires of a mod pack. Used for packaging and for
//! generating test fixtures.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use veles_common::{fingerprint, Encoding, Fingerprint, IntoBytes};

use crate::format::{CompressionMethod, EntryRawV4, PakHeader, MAGIC};
use crate::Result;

struct PendingEntry {
    fingerprint: Fingerprint,
    method: CompressionMethod,
    data: Vec<u8>,
}

/// Builder for a v4.0 PAK archive.
#[derive(Default)]
pub struct PakWriter {
    entries: Vec<PendingEntry>,
}

impl PakWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries queued.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries are queued.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Queue an entry under an explicit fingerprint.
    pub fn add(&mut self, fingerprint: Fingerprint, method: CompressionMethod, data: &[u8]) {
        self.entries.push(PendingEntry {
            fingerprint,
            method,
            data: data.to_vec(),
        });
    }

    /// Queue an entry under the fingerprint of `path`.
    pub fn add_path(&mut self, path: &str, encoding: Encoding, method: CompressionMethod, data: &[u8]) {
        self.add(fingerprint(path, encoding), method, data);
    }

    /// Serialize the archive to a byte vector.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.write_to(&mut out)?;
        Ok(out)
    }

    /// Write the archive to a file.
    pub fn write_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Write the archive to an arbitrary writer.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        let payloads: Vec<Vec<u8>> = self
            .entries
            .iter()
            .map(|e| compress_payload(&e.data, e.method))
            .collect::<Result<_>>()?;

        let header = PakHeader {
            magic: MAGIC,
            major: 4,
            minor: 0,
            feature_flags: 0,
            entry_count: self.entries.len() as u32,
            fingerprint: 0,
        };
        writer.write_all(header.as_bytes())?;

        let mut offset = (PakHeader::SIZE + self.entries.len() * EntryRawV4::SIZE) as i64;
        for (entry, payload) in self.entries.iter().zip(&payloads) {
            let stored_size = payload.len() as i64;
            let raw = EntryRawV4 {
                hash_lower: entry.fingerprint.lower_half(),
                hash_upper: entry.fingerprint.upper_half(),
                offset,
                stored_size,
                raw_size: entry.data.len() as i64,
                attributes: entry.method as u8 as i64,
                checksum: 0,
            };
            writer.write_all(raw.as_bytes())?;
            offset += stored_size;
        }

        for payload in &payloads {
            writer.write_all(payload)?;
        }

        Ok(())
    }
}

fn compress_payload(data: &[u8], method: CompressionMethod) -> Result<Vec<u8>> {
    match method {
        CompressionMethod::Store => Ok(data.to_vec()),
        CompressionMethod::Deflate => {
            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(data)?;
            Ok(encoder.finish()?)
        }
        CompressionMethod::Zstd => Ok(zstd::encode_all(data, 3)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_archive() {
        let bytes = PakWriter::new().to_bytes().unwrap();
        assert_eq!(bytes.len(), PakHeader::SIZE);
        assert_eq!(&bytes[..4], b"KPKA");
    }

    #[test]
    fn test_offsets_follow_table() {
        let mut writer = PakWriter::new();
        writer.add(
            Fingerprint::from_raw(1),
            CompressionMethod::Store,
            b"first",
        );
        writer.add(
            Fingerprint::from_raw(2),
            CompressionMethod::Store,
            b"second",
        );
        let bytes = writer.to_bytes().unwrap();

        let data_start = PakHeader::SIZE + 2 * EntryRawV4::SIZE;
        assert_eq!(&bytes[data_start..data_start + 5], b"first");
        assert_eq!(&bytes[data_start + 5..data_start + 11], b"second");
    }
}
