//! Merged archive index.
//!
//! An [`ArchiveIndex`] is one fingerprint-to-entry map built from an
//! ordered stack of archive layers (base game first, mod overlays after).
//! Later layers win metadata collisions; a resolved name, once set by any
//! resolution pass, survives merges of further layers.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use rustc_hash::FxHashMap;
use veles_common::Fingerprint;
use veles_pak::{PakArchive, PakEntry};

/// Directory prefix for entries whose path was never recovered.
pub const UNKNOWN_DIR: &str = "__Unknown";

/// One entry in the merged index.
///
/// Metadata (offset, sizes, compression, owning layer) always reflects the
/// last merged layer that defines this fingerprint. The resolved name is
/// sticky: it can be set exactly once and is never cleared or overwritten,
/// not even by a re-merge of the same layers into this index.
#[derive(Debug)]
pub struct IndexEntry {
    entry: PakEntry,
    layer: usize,
    name: OnceLock<String>,
}

impl IndexEntry {
    fn new(entry: PakEntry, layer: usize) -> Self {
        Self {
            entry,
            layer,
            name: OnceLock::new(),
        }
    }

    /// The entry's path fingerprint.
    #[inline]
    pub fn fingerprint(&self) -> Fingerprint {
        self.entry.fingerprint()
    }

    /// Container-level metadata from the winning layer.
    #[inline]
    pub fn pak_entry(&self) -> &PakEntry {
        &self.entry
    }

    /// Index of the layer that supplied the metadata.
    #[inline]
    pub fn layer(&self) -> usize {
        self.layer
    }

    /// The recovered path, if any resolution pass matched this entry.
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.get().map(|s| s.as_str())
    }

    /// Set the resolved name if it is still unset.
    ///
    /// Atomic set-if-unset; safe to call from concurrent resolution
    /// workers. Returns true if this call set the name.
    pub fn set_name(&self, name: &str) -> bool {
        self.name.set(name.to_string()).is_ok()
    }

    /// Path used for display and extraction: the resolved name, or a
    /// deterministic `__Unknown/<HEX16>` placeholder.
    pub fn display_path(&self) -> String {
        match self.name() {
            Some(name) => name.to_string(),
            None => format!("{}/{}", UNKNOWN_DIR, self.fingerprint()),
        }
    }
}

/// Fingerprint-to-entry map merged across ordered archive layers.
#[derive(Debug, Default)]
pub struct ArchiveIndex {
    entries: FxHashMap<Fingerprint, IndexEntry>,
    layers: Vec<PathBuf>,
}

impl ArchiveIndex {
    /// Build an index from archives in priority order: archives later in
    /// the slice override earlier ones on fingerprint collisions.
    pub fn merge(archives: &[PakArchive]) -> Self {
        let mut index = Self::default();
        for archive in archives {
            index.push_layer(archive);
        }
        index
    }

    /// Merge one more layer on top of the current index.
    pub fn push_layer(&mut self, archive: &PakArchive) {
        let layer = self.layers.len();
        self.layers.push(archive.path().to_path_buf());

        for entry in archive.iter() {
            self.entries
                .entry(entry.fingerprint())
                .and_modify(|existing| {
                    // Metadata follows the newest layer; the OnceLock name
                    // is deliberately left alone.
                    existing.entry = *entry;
                    existing.layer = layer;
                })
                .or_insert_with(|| IndexEntry::new(*entry, layer));
        }
    }

    /// Open each archive path in order, collecting per-layer failures
    /// instead of aborting. The caller decides whether a partially loaded
    /// stack is acceptable before merging the survivors.
    pub fn load_layers<P: AsRef<Path>>(
        paths: &[P],
    ) -> (Vec<PakArchive>, Vec<(PathBuf, veles_pak::Error)>) {
        let mut archives = Vec::with_capacity(paths.len());
        let mut failures = Vec::new();
        for path in paths {
            match PakArchive::open(path.as_ref()) {
                Ok(archive) => archives.push(archive),
                Err(err) => failures.push((path.as_ref().to_path_buf(), err)),
            }
        }
        (archives, failures)
    }

    /// Look up an entry by fingerprint.
    #[inline]
    pub fn get(&self, fingerprint: Fingerprint) -> Option<&IndexEntry> {
        self.entries.get(&fingerprint)
    }

    /// Number of distinct fingerprints.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all entries (unordered, restartable).
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &IndexEntry> + '_ {
        self.entries.values()
    }

    /// Iterate over entries with a resolved name ("show only valid files").
    #[inline]
    pub fn iter_named(&self) -> impl Iterator<Item = &IndexEntry> + '_ {
        self.entries.values().filter(|e| e.name().is_some())
    }

    /// All display paths, resolved names first, then (optionally) the
    /// `__Unknown/<HEX16>` placeholders.
    pub fn entry_paths(&self, include_unknown: bool) -> Vec<String> {
        let mut named = Vec::new();
        let mut unknown = Vec::new();
        for entry in self.entries.values() {
            match entry.name() {
                Some(name) => named.push(name.to_string()),
                None if include_unknown => unknown.push(entry.display_path()),
                None => {}
            }
        }
        named.sort();
        unknown.sort();
        named.extend(unknown);
        named
    }

    /// Filesystem path of a layer by index.
    #[inline]
    pub fn layer_path(&self, layer: usize) -> Option<&Path> {
        self.layers.get(layer).map(|p| p.as_path())
    }

    /// Number of merged layers.
    #[inline]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }
}
