//! Candidate dictionary loading.
//!
//! Candidate lists are community-maintained text files with one guessed
//! archive path per line. The loader owns the line-level hygiene (blank
//! lines, `#` comments, duplicates) so the resolver can treat its input as
//! a clean ordered sequence.

use std::path::Path;

use rustc_hash::FxHashSet;

use crate::{Error, Result};

/// Load a candidate list file.
///
/// Lines are trimmed; blank lines and `#` comments are dropped; duplicates
/// keep their first occurrence so resolution order stays deterministic.
pub fn load_candidates<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| Error::CandidateList {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(candidates_from_lines(contents.lines()))
}

/// Clean an in-memory sequence of candidate lines.
pub fn candidates_from_lines<'a, I>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = FxHashSet::default();
    let mut out = Vec::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if seen.insert(line.to_string()) {
            out.push(line.to_string());
        }
    }
    out
}
