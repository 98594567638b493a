//! MurmurHash3 path fingerprinting.
//!
//! RE-Engine PAK archives key their entries by a 64-bit fingerprint of the
//! original file path rather than the path itself. The fingerprint packs two
//! MurmurHash3 x86_32 hashes - one of the fully upper-cased path, one of the
//! fully lower-cased path - making it case-insensitive:
//!
//! ```text
//! fingerprint = (hash32(upper(path)) << 32) | hash32(lower(path))
//! ```
//!
//! Both hashes use the fixed seed `0xFFFFFFFF`. The path is hashed either as
//! UTF-8 or UTF-16LE bytes depending on the game profile; fingerprints are
//! only comparable within one encoding.
//!
//! The hash must stay bit-exact with the game's own tooling, so the
//! primitive is implemented here verbatim and pinned by known-answer tests.

use std::borrow::Cow;
use std::fmt;

/// Seed the game tooling uses for every path hash.
pub const PATH_HASH_SEED: u32 = 0xFFFF_FFFF;

/// Byte encoding applied to a path before hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Hash the path's UTF-8 bytes.
    Utf8,
    /// Hash the path's UTF-16LE bytes (the usual game profile).
    Utf16Le,
}

/// 64-bit case-insensitive identity of an archive path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Construct from a raw 64-bit value (as stored in an archive table).
    #[inline]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Construct from the two 32-bit halves stored in a v4 entry.
    #[inline]
    pub const fn from_halves(upper: u32, lower: u32) -> Self {
        Self(((upper as u64) << 32) | lower as u64)
    }

    /// The raw 64-bit value.
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Hash of the upper-cased path.
    #[inline]
    pub const fn upper_half(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Hash of the lower-cased path.
    #[inline]
    pub const fn lower_half(self) -> u32 {
        self.0 as u32
    }

    /// Parse a 16-digit hex form, as produced by `Display`.
    pub fn from_hex(s: &str) -> Option<Self> {
        u64::from_str_radix(s, 16).ok().map(Self)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016X}", self.0)
    }
}

/// Compute MurmurHash3 x86_32 of `data` with the given seed.
pub fn murmur3_32(data: &[u8], seed: u32) -> u32 {
    const C1: u32 = 0xcc9e_2d51;
    const C2: u32 = 0x1b87_3593;

    let mut h1 = seed;

    let mut chunks = data.chunks_exact(4);
    for block in &mut chunks {
        let mut k1 = u32::from_le_bytes([block[0], block[1], block[2], block[3]]);
        k1 = k1.wrapping_mul(C1);
        k1 = k1.rotate_left(15);
        k1 = k1.wrapping_mul(C2);
        h1 ^= k1;
        h1 = h1.rotate_left(13);
        h1 = h1.wrapping_mul(5).wrapping_add(0xe654_6b64);
    }

    let tail = chunks.remainder();
    if !tail.is_empty() {
        let mut k1 = 0u32;
        if tail.len() >= 3 {
            k1 ^= (tail[2] as u32) << 16;
        }
        if tail.len() >= 2 {
            k1 ^= (tail[1] as u32) << 8;
        }
        k1 ^= tail[0] as u32;
        k1 = k1.wrapping_mul(C1);
        k1 = k1.rotate_left(15);
        k1 = k1.wrapping_mul(C2);
        h1 ^= k1;
    }

    h1 ^= data.len() as u32;
    fmix32(h1)
}

/// Compute MurmurHash3 x86_32 with the fixed path seed.
///
/// This is the diagnostic entry point matching the game's path hasher.
#[inline]
pub fn hash32(data: &[u8]) -> u32 {
    murmur3_32(data, PATH_HASH_SEED)
}

#[inline]
fn fmix32(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h
}

/// Normalize a path the way the game's hasher expects.
///
/// Trims surrounding whitespace, converts backslashes to forward slashes,
/// and collapses repeated slashes. Returns a borrowed slice when the input
/// is already normalized.
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    let trimmed = path.trim();
    if !trimmed.contains('\\') && !trimmed.contains("//") {
        return Cow::Borrowed(trimmed);
    }
    let mut s = trimmed.replace('\\', "/");
    while s.contains("//") {
        s = s.replace("//", "/");
    }
    Cow::Owned(s)
}

/// Compute the 64-bit path fingerprint for `path` under `encoding`.
///
/// The path is normalized first (see [`normalize_path`]). Case transforms
/// are ASCII-only; non-ASCII characters pass through unchanged in both
/// halves.
pub fn fingerprint(path: &str, encoding: Encoding) -> Fingerprint {
    let normalized = normalize_path(path);
    let lower = normalized.to_ascii_lowercase();
    let upper = normalized.to_ascii_uppercase();

    let (lo, up) = match encoding {
        Encoding::Utf8 => (hash32(lower.as_bytes()), hash32(upper.as_bytes())),
        Encoding::Utf16Le => (hash32(&utf16le_bytes(&lower)), hash32(&utf16le_bytes(&upper))),
    };

    Fingerprint::from_halves(up, lo)
}

fn utf16le_bytes(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len() * 2);
    for unit in s.encode_utf16() {
        out.extend_from_slice(&unit.to_le_bytes());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    // Golden values generated once from the reference algorithm and pinned.
    #[test]
    fn test_hash32_known_answers() {
        assert_eq!(hash32(b""), 0x81F1_6F39);
        assert_eq!(hash32(b"a"), 0x2A68_4527);
        assert_eq!(hash32(b"abc"), 0xFC80_C2AF);
        assert_eq!(hash32(b"abcd"), 0x2B7D_C558);
        assert_eq!(hash32(b"hello world"), 0x4C61_FEA0);
    }

    #[test]
    fn test_fingerprint_known_answers() {
        let fp = fingerprint("player/pl0000.motlist", Encoding::Utf16Le);
        assert_eq!(fp.raw(), 0xACF4_B75A_0D59_23C6);
        assert_eq!(fp.upper_half(), 0xACF4_B75A);
        assert_eq!(fp.lower_half(), 0x0D59_23C6);

        let fp = fingerprint("player/pl0000.motlist", Encoding::Utf8);
        assert_eq!(fp.raw(), 0xA853_15C8_0E17_D09C);
    }

    #[test]
    fn test_fingerprint_case_insensitive() {
        for enc in [Encoding::Utf8, Encoding::Utf16Le] {
            let a = fingerprint("player/pl0000.motlist", enc);
            let b = fingerprint("Player/PL0000.MotList", enc);
            let c = fingerprint("PLAYER/PL0000.MOTLIST", enc);
            assert_eq!(a, b);
            assert_eq!(a, c);
        }
    }

    #[test]
    fn test_fingerprint_separator_insensitive() {
        let fwd = fingerprint("player/pl0000.motlist", Encoding::Utf16Le);
        let back = fingerprint("player\\pl0000.motlist", Encoding::Utf16Le);
        let doubled = fingerprint("player//pl0000.motlist", Encoding::Utf16Le);
        let padded = fingerprint("  player/pl0000.motlist  ", Encoding::Utf16Le);
        assert_eq!(fwd, back);
        assert_eq!(fwd, doubled);
        assert_eq!(fwd, padded);
    }

    #[test]
    fn test_encodings_disagree() {
        let utf8 = fingerprint("player/pl0000.motlist", Encoding::Utf8);
        let utf16 = fingerprint("player/pl0000.motlist", Encoding::Utf16Le);
        assert_ne!(utf8, utf16);
    }

    #[test]
    fn test_fingerprint_display_roundtrip() {
        let fp = fingerprint("natives/stm/sound.pck", Encoding::Utf16Le);
        assert_eq!(fp.to_string(), "9D812B3280B1E3FF");
        assert_eq!(Fingerprint::from_hex(&fp.to_string()), Some(fp));
    }

    #[test]
    fn test_normalize_borrows_when_clean() {
        assert!(matches!(
            normalize_path("already/clean.ext"),
            Cow::Borrowed(_)
        ));
        assert_eq!(normalize_path("a\\\\b"), "a/b");
    }
}
