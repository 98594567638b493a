//! Path resolution against the merged index.
//!
//! A resolution pass hashes every candidate path and assigns matching
//! candidates as the resolved names of hash-only index entries. Hashing is
//! pure and embarrassingly parallel, so it runs on the rayon pool; the
//! assignment sweep is a single ordered pass, which keeps first-match-wins
//! deterministic and never blocks behind a global lock (names are
//! per-entry set-if-unset).

use rayon::prelude::*;
use veles_common::{fingerprint, Encoding, Fingerprint};

use crate::index::ArchiveIndex;

/// Outcome of one resolution pass.
#[derive(Debug, Default)]
pub struct Resolution {
    /// Entries whose name this pass newly set.
    pub updated: u64,
    /// Candidates with no matching entry, in input order.
    ///
    /// Only populated in UTF-8 mode; see [`resolve_utf16le`].
    pub unresolved: Vec<String>,
}

/// Run one resolution pass over `candidates` with the given encoding.
///
/// For each candidate the fingerprint is computed and looked up:
/// no entry and UTF-8 mode records the candidate as unresolved; an entry
/// with a name already set is left alone; an unnamed entry takes the
/// candidate as its sticky resolved name. If two candidates in one pass
/// collide on a fingerprint, the first in input order wins.
///
/// Re-running an identical pass is idempotent: it updates nothing and
/// reports the same unresolved candidates.
pub fn resolve(index: &ArchiveIndex, candidates: &[String], encoding: Encoding) -> Resolution {
    let report_unresolved = encoding == Encoding::Utf8;

    let fingerprints: Vec<Fingerprint> = candidates
        .par_iter()
        .map(|candidate| fingerprint(candidate, encoding))
        .collect();

    let mut result = Resolution::default();
    for (candidate, fp) in candidates.iter().zip(fingerprints) {
        match index.get(fp) {
            None => {
                if report_unresolved {
                    result.unresolved.push(candidate.clone());
                }
            }
            Some(entry) => {
                if entry.set_name(candidate) {
                    result.updated += 1;
                }
            }
        }
    }
    result
}

/// Resolution entry point for UTF-8 game profiles.
///
/// Reports candidates that matched nothing, ready for a retry against a
/// different archive stack.
pub fn resolve_utf8(index: &ArchiveIndex, candidates: &[String]) -> Resolution {
    resolve(index, candidates, Encoding::Utf8)
}

/// Resolution entry point for UTF-16LE game profiles (the common case).
///
/// Unlike [`resolve_utf8`], unmatched candidates are discarded rather than
/// reported; `Resolution::unresolved` is always empty. This asymmetry is
/// inherited from the reference tooling and kept until clarified upstream.
pub fn resolve_utf16le(index: &ArchiveIndex, candidates: &[String]) -> Resolution {
    resolve(index, candidates, Encoding::Utf16Le)
}
