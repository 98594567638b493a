//! Decompression utilities for PAK payloads.

use std::io::Read;

use flate2::read::{DeflateDecoder, ZlibDecoder};

use crate::{Error, Result};

/// Decompress Zstandard-compressed data with known output size.
pub fn decompress_zstd_sized(data: &[u8], expected_size: usize) -> Result<Vec<u8>> {
    let mut decoder = zstd::Decoder::new(data).map_err(|e| Error::Decompression(e.to_string()))?;
    let mut output = Vec::with_capacity(expected_size);
    decoder
        .read_to_end(&mut output)
        .map_err(|e| Error::Decompression(e.to_string()))?;
    Ok(output)
}

/// Decompress DEFLATE-compressed data with known output size.
///
/// Most archives wrap the stream in a zlib header; a few store the raw
/// DEFLATE stream, so failure to decode as zlib falls back to raw.
pub fn decompress_deflate_sized(data: &[u8], expected_size: usize) -> Result<Vec<u8>> {
    let mut output = Vec::with_capacity(expected_size);

    let mut decoder = ZlibDecoder::new(data);
    if decoder.read_to_end(&mut output).is_ok() {
        return Ok(output);
    }

    output.clear();
    let mut decoder = DeflateDecoder::new(data);
    decoder
        .read_to_end(&mut output)
        .map_err(|e| Error::Decompression(e.to_string()))?;
    Ok(output)
}
