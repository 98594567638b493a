//! Game directory scanning.
//!
//! Finds a game installation's pak layers in the order the engine loads
//! them: base archives at the top level sorted by name, then `dlc/*.pak`,
//! then per-DLC numeric subdirectories containing `re_dlc_000.pak`.
//! Layers later in the returned list override earlier ones, so the list
//! feeds directly into an index merge.

use std::io;
use std::path::{Path, PathBuf};

/// Archives at or below this size are loader stubs left behind by mod
/// managers and carry no entry table.
const STUB_SIZE: u64 = 16;

/// Scan `dir` for pak layers in engine load order.
///
/// Scanning normally stops at the first stub-sized top-level archive,
/// mirroring the engine's sequential chunk loading; mod-manager paks
/// placed after a stub are not part of the real load order. Passing
/// `scan_past_stubs` instead skips stubs and keeps going.
pub fn scan_pak_files(dir: &Path, scan_past_stubs: bool) -> io::Result<Vec<PathBuf>> {
    let mut results = Vec::new();

    for pak in sorted_paks(dir)? {
        let size = std::fs::metadata(&pak)?.len();
        if size <= STUB_SIZE {
            if scan_past_stubs {
                continue;
            }
            break;
        }
        results.push(pak);
    }

    let dlc = dir.join("dlc");
    if dlc.is_dir() {
        results.extend(sorted_paks(&dlc)?);
    }

    let mut numeric_dirs: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_dir()
                && p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
        })
        .collect();
    numeric_dirs.sort();

    for sub in numeric_dirs {
        let pak = sub.join("re_dlc_000.pak");
        if pak.exists() {
            results.push(pak);
        }
    }

    Ok(results)
}

fn sorted_paks(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut paks: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_file() && p.extension().and_then(|e| e.to_str()) == Some("pak")
        })
        .collect();
    paks.sort();
    Ok(paks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_scan_order() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        fs::write(root.join("re_chunk_000.pak"), vec![0u8; 64]).unwrap();
        fs::write(root.join("re_chunk_000.pak.patch_001.pak"), vec![0u8; 64]).unwrap();
        fs::create_dir(root.join("dlc")).unwrap();
        fs::write(root.join("dlc/extra.pak"), vec![0u8; 64]).unwrap();
        fs::create_dir(root.join("1057550")).unwrap();
        fs::write(root.join("1057550/re_dlc_000.pak"), vec![0u8; 64]).unwrap();
        fs::create_dir(root.join("textures")).unwrap();

        let found = scan_pak_files(root, true).unwrap();
        let names: Vec<String> = found
            .iter()
            .map(|p| {
                p.strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();

        assert_eq!(
            names,
            [
                "re_chunk_000.pak",
                "re_chunk_000.pak.patch_001.pak",
                "dlc/extra.pak",
                "1057550/re_dlc_000.pak",
            ]
        );
    }

    #[test]
    fn test_stub_stops_scan() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        fs::write(root.join("a.pak"), vec![0u8; 64]).unwrap();
        fs::write(root.join("b.pak"), vec![0u8; 8]).unwrap();
        fs::write(root.join("c.pak"), vec![0u8; 64]).unwrap();

        let stopped = scan_pak_files(root, false).unwrap();
        assert_eq!(stopped, [root.join("a.pak")]);

        let skipped = scan_pak_files(root, true).unwrap();
        assert_eq!(skipped, [root.join("a.pak"), root.join("c.pak")]);
    }
}
