//! Extraction pipeline.
//!
//! Streams selected index entries out of their owning archive layers into
//! an output tree. Extraction is I/O bound, so work fans out over a small
//! fixed pool of threads fed through a channel; one worker handles one
//! destination file at a time. Cancellation is cooperative at item
//! granularity: an in-flight write always finishes, later items are
//! skipped, and nothing already on disk is rolled back.

use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use veles_common::Fingerprint;
use veles_pak::PakArchive;

use crate::index::{ArchiveIndex, IndexEntry};
use crate::{Error, Result};

/// Cooperative cancellation flag, cheap to clone across threads.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Items not yet started will be skipped.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Receiver for per-item completion updates.
pub trait ProgressSink: Sync {
    /// Called after each finished item with (items done, items total).
    fn on_progress(&self, done: u64, total: u64);
}

impl<F: Fn(u64, u64) + Sync> ProgressSink for F {
    fn on_progress(&self, done: u64, total: u64) {
        self(done, total)
    }
}

/// A sink that ignores all updates.
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&self, _done: u64, _total: u64) {}
}

/// Which index entries to extract.
#[derive(Debug, Clone)]
pub enum Selection {
    /// Every entry in the index.
    All,
    /// Only entries with these fingerprints; fingerprints absent from the
    /// index are silently ignored.
    Fingerprints(FxHashSet<Fingerprint>),
}

impl Selection {
    fn matches(&self, fingerprint: Fingerprint) -> bool {
        match self {
            Selection::All => true,
            Selection::Fingerprints(set) => set.contains(&fingerprint),
        }
    }
}

/// Extraction tuning knobs.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Worker thread count; bounded by archive/disk parallelism, not CPU
    /// count. Values below 1 are clamped to a sequential run.
    pub workers: usize,
    /// Append a sniffed extension to `__Unknown` outputs when the payload
    /// starts with an ASCII format tag.
    pub sniff_unknown_extensions: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            workers: 4,
            sniff_unknown_extensions: true,
        }
    }
}

/// A single entry that failed to extract.
#[derive(Debug)]
pub struct ItemFailure {
    /// Fingerprint of the failed entry.
    pub fingerprint: Fingerprint,
    /// Resolved name at extraction time, if any.
    pub name: Option<String>,
    /// What went wrong for this item.
    pub error: Error,
}

/// Aggregate outcome of an extraction run.
#[derive(Debug, Default)]
pub struct ExtractionReport {
    /// Items written to disk.
    pub succeeded: u64,
    /// Items that failed, with their individual errors.
    pub failed: Vec<ItemFailure>,
    /// Whether the run stopped early on a cancellation request.
    pub cancelled: bool,
}

impl ExtractionReport {
    /// Items attempted (succeeded plus failed).
    pub fn attempted(&self) -> u64 {
        self.succeeded + self.failed.len() as u64
    }
}

/// Extract `selection` from `index` into `output_dir`.
///
/// Per-item failures are collected in the report, never propagated; the
/// only hard errors are creating the output root and pool plumbing.
/// Progress fires after every finished item, successful or not.
pub fn extract(
    index: &ArchiveIndex,
    selection: &Selection,
    output_dir: &Path,
    options: &ExtractOptions,
    cancel: &CancelToken,
    progress: &dyn ProgressSink,
) -> Result<ExtractionReport> {
    std::fs::create_dir_all(output_dir)?;

    // Stable order: by owning layer, then payload offset, for sequential
    // reads within each archive.
    let mut items: Vec<&IndexEntry> = index
        .iter()
        .filter(|e| selection.matches(e.fingerprint()))
        .collect();
    items.sort_by_key(|e| (e.layer(), e.pak_entry().offset()));

    let total = items.len() as u64;
    let layers = open_layers(index, &items);

    let ctx = ExtractContext {
        layers: &layers,
        output_dir,
        sniff: options.sniff_unknown_extensions,
    };

    let mut report = ExtractionReport::default();
    if options.workers <= 1 {
        run_sequential(&items, &ctx, cancel, progress, total, &mut report);
    } else {
        run_pool(&items, &ctx, options.workers, cancel, progress, total, &mut report);
    }

    report.cancelled = cancel.is_cancelled();
    Ok(report)
}

struct LayerSource {
    path: PathBuf,
    archive: Option<PakArchive>,
}

struct ExtractContext<'a> {
    layers: &'a FxHashMap<usize, LayerSource>,
    output_dir: &'a Path,
    sniff: bool,
}

fn run_sequential(
    items: &[&IndexEntry],
    ctx: &ExtractContext<'_>,
    cancel: &CancelToken,
    progress: &dyn ProgressSink,
    total: u64,
    report: &mut ExtractionReport,
) {
    let mut done = 0u64;
    for &item in items {
        if cancel.is_cancelled() {
            break;
        }
        record(report, item, extract_item(item, ctx));
        done += 1;
        progress.on_progress(done, total);
    }
}

fn run_pool(
    items: &[&IndexEntry],
    ctx: &ExtractContext<'_>,
    workers: usize,
    cancel: &CancelToken,
    progress: &dyn ProgressSink,
    total: u64,
    report: &mut ExtractionReport,
) {
    let (work_tx, work_rx) = crossbeam_channel::bounded::<&IndexEntry>(workers * 2);
    let (done_tx, done_rx) = crossbeam_channel::unbounded();

    std::thread::scope(|scope| {
        for _ in 0..workers {
            let work_rx = work_rx.clone();
            let done_tx = done_tx.clone();
            scope.spawn(move || {
                while let Ok(item) = work_rx.recv() {
                    // Drain without working once cancelled; items already
                    // received still count as never started.
                    if cancel.is_cancelled() {
                        continue;
                    }
                    let result = extract_item(item, ctx);
                    if done_tx.send((item, result)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(done_tx);

        let feeder = scope.spawn(move || {
            for &item in items {
                if cancel.is_cancelled() {
                    break;
                }
                if work_tx.send(item).is_err() {
                    break;
                }
            }
        });

        let mut done = 0u64;
        for (item, result) in done_rx {
            record(report, item, result);
            done += 1;
            progress.on_progress(done, total);
        }

        let _ = feeder.join();
    });
}

fn record(report: &mut ExtractionReport, item: &IndexEntry, result: Result<()>) {
    match result {
        Ok(()) => report.succeeded += 1,
        Err(error) => report.failed.push(ItemFailure {
            fingerprint: item.fingerprint(),
            name: item.name().map(|s| s.to_string()),
            error,
        }),
    }
}

fn open_layers(index: &ArchiveIndex, items: &[&IndexEntry]) -> FxHashMap<usize, LayerSource> {
    let mut layers: Vec<usize> = items.iter().map(|e| e.layer()).collect();
    layers.sort_unstable();
    layers.dedup();

    layers
        .into_iter()
        .map(|layer| {
            let path = index
                .layer_path(layer)
                .map(|p| p.to_path_buf())
                .unwrap_or_default();
            let archive = PakArchive::open(&path).ok();
            (layer, LayerSource { path, archive })
        })
        .collect()
}

fn extract_item(item: &IndexEntry, ctx: &ExtractContext<'_>) -> Result<()> {
    let source = ctx
        .layers
        .get(&item.layer())
        .ok_or_else(|| veles_pak::Error::MissingArchive(PathBuf::new()))?;
    let archive = source
        .archive
        .as_ref()
        .ok_or_else(|| veles_pak::Error::MissingArchive(source.path.clone()))?;

    let data = archive.read_entry(item.pak_entry())?;
    let path = output_path(item, &data, ctx)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, &data)?;
    Ok(())
}

fn output_path(item: &IndexEntry, data: &[u8], ctx: &ExtractContext<'_>) -> Result<PathBuf> {
    let mut rel = item.display_path();
    if item.name().is_none() && ctx.sniff {
        if let Some(ext) = guess_extension(data) {
            rel.push('.');
            rel.push_str(&ext);
        }
    }

    // Resolved names come from untrusted candidate lists; only plain
    // relative components may be joined under the output root.
    let rel_trimmed = rel.trim_start_matches('/');
    let relative = Path::new(rel_trimmed);
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return Err(Error::UnsafeOutputPath(rel));
    }
    Ok(ctx.output_dir.join(relative))
}

/// Guess a file extension from a payload's leading ASCII format tag.
///
/// Game formats typically open with a short uppercase tag ("MOT ", "SCN ",
/// "TEX\0"); three or more leading alphanumeric bytes are taken as the
/// extension.
fn guess_extension(data: &[u8]) -> Option<String> {
    let mut tag = Vec::new();
    for &b in data.iter().take(8) {
        if b.is_ascii_alphanumeric() || b == b'_' {
            tag.push(b.to_ascii_uppercase());
        } else {
            break;
        }
    }
    if tag.len() >= 3 {
        String::from_utf8(tag).ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veles_common::{fingerprint, Encoding};
    use veles_pak::{CompressionMethod, PakWriter};

    const ENC: Encoding = Encoding::Utf16Le;

    fn build_index(
        dir: &Path,
        file_name: &str,
        entries: &[(&str, &[u8], CompressionMethod)],
    ) -> ArchiveIndex {
        let mut writer = PakWriter::new();
        for (path, data, method) in entries {
            writer.add_path(path, ENC, *method, data);
        }
        let pak_path = dir.join(file_name);
        writer.write_file(&pak_path).unwrap();
        let archive = PakArchive::open(&pak_path).unwrap();
        ArchiveIndex::merge(&[archive])
    }

    fn resolve_all(index: &ArchiveIndex, names: &[&str]) {
        let candidates: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        crate::resolve::resolve_utf16le(index, &candidates);
    }

    fn count_files(dir: &Path) -> usize {
        let mut count = 0;
        for entry in std::fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                count += count_files(&path);
            } else {
                count += 1;
            }
        }
        count
    }

    #[test]
    fn test_extract_all_resolved() {
        let dir = tempfile::tempdir().unwrap();
        let index = build_index(
            dir.path(),
            "base.pak",
            &[
                ("sound/bgm.pck", b"music", CompressionMethod::Zstd),
                ("ui/menu.msg", b"menu text", CompressionMethod::Deflate),
            ],
        );
        resolve_all(&index, &["sound/bgm.pck", "ui/menu.msg"]);

        let out = dir.path().join("out");
        let report = extract(
            &index,
            &Selection::All,
            &out,
            &ExtractOptions::default(),
            &CancelToken::new(),
            &NoProgress,
        )
        .unwrap();

        assert_eq!(report.succeeded, 2);
        assert!(report.failed.is_empty());
        assert!(!report.cancelled);
        assert_eq!(std::fs::read(out.join("sound/bgm.pck")).unwrap(), b"music");
        assert_eq!(std::fs::read(out.join("ui/menu.msg")).unwrap(), b"menu text");
    }

    #[test]
    fn test_unknown_entries_get_placeholder_names() {
        let dir = tempfile::tempdir().unwrap();
        let index = build_index(
            dir.path(),
            "base.pak",
            &[("secret/file.mot", b"MOT \x01\x02", CompressionMethod::Store)],
        );

        let out = dir.path().join("out");
        let report = extract(
            &index,
            &Selection::All,
            &out,
            &ExtractOptions {
                workers: 1,
                ..Default::default()
            },
            &CancelToken::new(),
            &NoProgress,
        )
        .unwrap();

        assert_eq!(report.succeeded, 1);
        let fp = fingerprint("secret/file.mot", ENC);
        let expected = out.join("__Unknown").join(format!("{}.MOT", fp));
        assert!(expected.exists(), "missing {}", expected.display());
    }

    #[test]
    fn test_selection_by_fingerprint() {
        let dir = tempfile::tempdir().unwrap();
        let index = build_index(
            dir.path(),
            "base.pak",
            &[
                ("a/one.txt", b"1", CompressionMethod::Store),
                ("a/two.txt", b"2", CompressionMethod::Store),
            ],
        );
        resolve_all(&index, &["a/one.txt", "a/two.txt"]);

        let mut wanted = FxHashSet::default();
        wanted.insert(fingerprint("a/two.txt", ENC));

        let out = dir.path().join("out");
        let report = extract(
            &index,
            &Selection::Fingerprints(wanted),
            &out,
            &ExtractOptions::default(),
            &CancelToken::new(),
            &NoProgress,
        )
        .unwrap();

        assert_eq!(report.succeeded, 1);
        assert!(!out.join("a/one.txt").exists());
        assert!(out.join("a/two.txt").exists());
    }

    #[test]
    fn test_per_item_failure_isolation() {
        let dir = tempfile::tempdir().unwrap();

        let names = ["f/0.bin", "f/1.bin", "f/2.bin", "f/3.bin", "f/4.bin"];
        let mut writer = PakWriter::new();
        for name in names {
            writer.add_path(name, ENC, CompressionMethod::Store, b"payload");
        }
        let pak_path = dir.path().join("base.pak");
        writer.write_file(&pak_path).unwrap();

        // Corrupt the compression tag of the third table record
        // (attributes sit 32 bytes into each 48-byte entry).
        let mut bytes = std::fs::read(&pak_path).unwrap();
        bytes[16 + 2 * 48 + 32] = 9;
        std::fs::write(&pak_path, &bytes).unwrap();

        let archive = PakArchive::open(&pak_path).unwrap();
        let index = ArchiveIndex::merge(&[archive]);
        resolve_all(&index, &names);

        let out = dir.path().join("out");
        let report = extract(
            &index,
            &Selection::All,
            &out,
            &ExtractOptions::default(),
            &CancelToken::new(),
            &NoProgress,
        )
        .unwrap();

        assert_eq!(report.succeeded, 4);
        assert_eq!(report.failed.len(), 1);
        assert!(matches!(
            report.failed[0].error,
            Error::Pak(veles_pak::Error::UnsupportedCompression(9))
        ));
        assert!(!report.cancelled);
    }

    #[test]
    fn test_cancellation_partial_completion() {
        let dir = tempfile::tempdir().unwrap();

        let names: Vec<String> = (0..10).map(|i| format!("c/{}.bin", i)).collect();
        let mut writer = PakWriter::new();
        for name in &names {
            writer.add_path(name, ENC, CompressionMethod::Store, b"data");
        }
        let pak_path = dir.path().join("base.pak");
        writer.write_file(&pak_path).unwrap();

        let archive = PakArchive::open(&pak_path).unwrap();
        let index = ArchiveIndex::merge(&[archive]);
        crate::resolve::resolve_utf16le(&index, &names);

        let token = CancelToken::new();
        let cancel_after = token.clone();
        let progress = move |done: u64, _total: u64| {
            if done == 4 {
                cancel_after.cancel();
            }
        };

        let out = dir.path().join("out");
        let report = extract(
            &index,
            &Selection::All,
            &out,
            &ExtractOptions {
                workers: 1,
                ..Default::default()
            },
            &token,
            &progress,
        )
        .unwrap();

        assert!(report.cancelled);
        assert_eq!(report.succeeded, 4);
        assert!(report.failed.is_empty());
        assert_eq!(count_files(&out), 4);
    }

    #[test]
    fn test_missing_layer_fails_items_not_batch() {
        let dir = tempfile::tempdir().unwrap();
        let index = build_index(
            dir.path(),
            "base.pak",
            &[("a/file.txt", b"data", CompressionMethod::Store)],
        );
        std::fs::remove_file(dir.path().join("base.pak")).unwrap();

        let out = dir.path().join("out");
        let report = extract(
            &index,
            &Selection::All,
            &out,
            &ExtractOptions::default(),
            &CancelToken::new(),
            &NoProgress,
        )
        .unwrap();

        assert_eq!(report.succeeded, 0);
        assert_eq!(report.failed.len(), 1);
        assert!(matches!(
            report.failed[0].error,
            Error::Pak(veles_pak::Error::MissingArchive(_))
        ));
    }

    #[test]
    fn test_pool_extracts_everything() {
        let dir = tempfile::tempdir().unwrap();
        let names: Vec<String> = (0..32).map(|i| format!("p/{:02}.bin", i)).collect();
        let mut writer = PakWriter::new();
        for name in &names {
            writer.add_path(name, ENC, CompressionMethod::Deflate, name.as_bytes());
        }
        let pak_path = dir.path().join("base.pak");
        writer.write_file(&pak_path).unwrap();

        let archive = PakArchive::open(&pak_path).unwrap();
        let index = ArchiveIndex::merge(&[archive]);
        crate::resolve::resolve_utf16le(&index, &names);

        let out = dir.path().join("out");
        let report = extract(
            &index,
            &Selection::All,
            &out,
            &ExtractOptions {
                workers: 4,
                ..Default::default()
            },
            &CancelToken::new(),
            &NoProgress,
        )
        .unwrap();

        assert_eq!(report.succeeded, 32);
        assert_eq!(count_files(&out), 32);
        for name in &names {
            assert_eq!(std::fs::read(out.join(name)).unwrap(), name.as_bytes());
        }
    }

    #[test]
    fn test_traversal_name_fails_item_without_escaping() {
        let dir = tempfile::tempdir().unwrap();
        let index = build_index(
            dir.path(),
            "base.pak",
            &[("evil.bin", b"payload", CompressionMethod::Store)],
        );
        let fp = fingerprint("evil.bin", ENC);
        assert!(index.get(fp).unwrap().set_name("../escape.bin"));

        let out = dir.path().join("nested").join("out");
        let report = extract(
            &index,
            &Selection::All,
            &out,
            &ExtractOptions::default(),
            &CancelToken::new(),
            &NoProgress,
        )
        .unwrap();

        assert_eq!(report.succeeded, 0);
        assert_eq!(report.failed.len(), 1);
        assert!(matches!(
            report.failed[0].error,
            Error::UnsafeOutputPath(_)
        ));
        assert!(!dir.path().join("nested").join("escape.bin").exists());
    }

    #[test]
    fn test_guess_extension() {
        assert_eq!(guess_extension(b"MOT \x00\x01"), Some("MOT".to_string()));
        assert_eq!(guess_extension(b"tex\x00rest"), Some("TEX".to_string()));
        assert_eq!(guess_extension(b"AB\x00"), None);
        assert_eq!(guess_extension(b""), None);
    }
}
