//! Veles CLI - Command-line tool for RE-Engine PAK archive browsing,
//! name resolution, and extraction.
//!
//! This is the main entry point for the Veles command-line application.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rustc_hash::FxHashSet;

use veles::index::Resolution;
use veles::prelude::*;

/// Veles - RE-Engine PAK archive indexing and extraction tool
#[derive(Parser)]
#[command(name = "veles")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List entries across an ordered stack of PAK archives
    List {
        /// PAK files in priority order (later files win on conflicts)
        #[arg(short, long, env = "INPUT_PAKS", required = true, num_args = 1..)]
        paks: Vec<PathBuf>,

        /// Candidate path list used to recover entry names
        #[arg(short, long)]
        list: Option<PathBuf>,

        /// Only show entries with a recovered name
        #[arg(long)]
        named_only: bool,

        /// Show sizes, compression tags, and layer numbers
        #[arg(short, long)]
        detailed: bool,

        /// Hash candidate paths as UTF-8 instead of UTF-16LE
        #[arg(long)]
        utf8: bool,
    },

    /// Extract entries to an output directory
    Extract {
        /// PAK files in priority order (later files win on conflicts)
        #[arg(short, long, env = "INPUT_PAKS", required = true, num_args = 1..)]
        paks: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long, env = "OUTPUT_FOLDER")]
        output: PathBuf,

        /// Candidate path list used to recover entry names
        #[arg(short, long)]
        list: Option<PathBuf>,

        /// Filter pattern on recovered names (glob-style)
        #[arg(short, long)]
        filter: Option<String>,

        /// Worker thread count
        #[arg(short, long, default_value_t = 4)]
        workers: usize,

        /// Hash candidate paths as UTF-8 instead of UTF-16LE
        #[arg(long)]
        utf8: bool,
    },

    /// Run a resolution pass and report how many names were recovered
    Resolve {
        /// PAK files in priority order
        #[arg(short, long, env = "INPUT_PAKS", required = true, num_args = 1..)]
        paks: Vec<PathBuf>,

        /// Candidate path list
        #[arg(short, long)]
        list: PathBuf,

        /// Hash candidate paths as UTF-8 instead of UTF-16LE
        #[arg(long)]
        utf8: bool,

        /// Print every unresolved candidate (UTF-8 mode only)
        #[arg(long)]
        print_unresolved: bool,
    },

    /// Scan a game directory for PAK layers in load order
    Scan {
        /// Game installation directory
        #[arg(short, long)]
        dir: PathBuf,

        /// Keep scanning past 16-byte placeholder PAK files instead of
        /// stopping the load order there
        #[arg(long)]
        scan_past_stubs: bool,
    },

    /// Hash a path string with the archive fingerprint scheme
    Hash {
        /// Path string to hash
        path: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::List {
            paks,
            list,
            named_only,
            detailed,
            utf8,
        } => cmd_list(&paks, list.as_deref(), named_only, detailed, encoding(utf8))?,
        Commands::Extract {
            paks,
            output,
            list,
            filter,
            workers,
            utf8,
        } => cmd_extract(
            &paks,
            &output,
            list.as_deref(),
            filter.as_deref(),
            workers,
            encoding(utf8),
        )?,
        Commands::Resolve {
            paks,
            list,
            utf8,
            print_unresolved,
        } => cmd_resolve(&paks, &list, encoding(utf8), print_unresolved)?,
        Commands::Scan {
            dir,
            scan_past_stubs,
        } => cmd_scan(&dir, scan_past_stubs)?,
        Commands::Hash { path } => cmd_hash(&path),
    }

    Ok(())
}

fn encoding(utf8: bool) -> Encoding {
    if utf8 {
        Encoding::Utf8
    } else {
        Encoding::Utf16Le
    }
}

fn load_index(paks: &[PathBuf]) -> Result<ArchiveIndex> {
    let start = Instant::now();
    let (layers, failures) = ArchiveIndex::load_layers(paks);
    for (path, err) in &failures {
        eprintln!("Skipping {}: {}", path.display(), err);
    }
    anyhow::ensure!(!layers.is_empty(), "no loadable PAK archives");

    let index = ArchiveIndex::merge(&layers);
    println!(
        "Indexed {} entries from {} layer(s) in {:?}",
        index.len(),
        index.layer_count(),
        start.elapsed()
    );
    Ok(index)
}

fn resolve_from_list(index: &ArchiveIndex, list: &Path, enc: Encoding) -> Result<Resolution> {
    let candidates = dictionary::load_candidates(list)
        .with_context(|| format!("Failed to load candidate list {}", list.display()))?;

    let start = Instant::now();
    let result = match enc {
        Encoding::Utf8 => resolve_utf8(index, &candidates),
        Encoding::Utf16Le => resolve_utf16le(index, &candidates),
    };
    println!(
        "Resolved {} of {} entries from {} candidates in {:?}",
        result.updated,
        index.len(),
        candidates.len(),
        start.elapsed()
    );
    Ok(result)
}

fn cmd_list(
    paks: &[PathBuf],
    list: Option<&Path>,
    named_only: bool,
    detailed: bool,
    enc: Encoding,
) -> Result<()> {
    let index = load_index(paks)?;
    if let Some(list) = list {
        resolve_from_list(&index, list, enc)?;
    }

    let mut rows: Vec<(String, &IndexEntry)> = index
        .iter()
        .filter(|entry| !named_only || entry.name().is_some())
        .map(|entry| (entry.display_path(), entry))
        .collect();
    rows.sort_by(|a, b| a.0.cmp(&b.0));

    for (path, entry) in &rows {
        if detailed {
            let pak = entry.pak_entry();
            println!(
                "{:>12} {:>12}  c{} L{}  {}",
                pak.stored_size(),
                pak.raw_size(),
                pak.compression_tag(),
                entry.layer(),
                path
            );
        } else {
            println!("{}", path);
        }
    }

    println!("\nTotal: {} entries", rows.len());
    Ok(())
}

fn cmd_extract(
    paks: &[PathBuf],
    output: &Path,
    list: Option<&Path>,
    filter: Option<&str>,
    workers: usize,
    enc: Encoding,
) -> Result<()> {
    let index = load_index(paks)?;
    if let Some(list) = list {
        resolve_from_list(&index, list, enc)?;
    }

    let selection = if let Some(pattern) = filter {
        let mut matched = FxHashSet::default();
        for entry in index.iter() {
            if glob_match(pattern, &entry.display_path()) {
                matched.insert(entry.fingerprint());
            }
        }
        anyhow::ensure!(!matched.is_empty(), "filter matched no entries");
        println!("Extracting {} matching entries...", matched.len());
        Selection::Fingerprints(matched)
    } else {
        println!("Extracting all {} entries...", index.len());
        Selection::All
    };

    let total = match &selection {
        Selection::All => index.len(),
        Selection::Fingerprints(set) => set.len(),
    };

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let options = ExtractOptions {
        workers,
        ..Default::default()
    };
    let progress = |done: u64, _total: u64| pb.set_position(done);

    let start = Instant::now();
    let report = extract(
        &index,
        &selection,
        output,
        &options,
        &CancelToken::new(),
        &progress,
    )
    .context("Extraction failed")?;
    pb.finish_with_message("Done");

    println!(
        "Extracted {} entries in {:?} ({} failed)",
        report.succeeded,
        start.elapsed(),
        report.failed.len()
    );
    for failure in report.failed.iter().take(20) {
        eprintln!(
            "  {} ({}): {}",
            failure.name.as_deref().unwrap_or("<unknown>"),
            failure.fingerprint,
            failure.error
        );
    }
    if report.failed.len() > 20 {
        eprintln!("  ... and {} more", report.failed.len() - 20);
    }

    Ok(())
}

fn cmd_resolve(paks: &[PathBuf], list: &Path, enc: Encoding, print_unresolved: bool) -> Result<()> {
    let index = load_index(paks)?;
    let result = resolve_from_list(&index, list, enc)?;

    if !result.unresolved.is_empty() {
        println!("{} candidates matched nothing", result.unresolved.len());
        if print_unresolved {
            for candidate in &result.unresolved {
                println!("{}", candidate);
            }
        }
    }

    Ok(())
}

fn cmd_scan(dir: &Path, scan_past_stubs: bool) -> Result<()> {
    let found = locate::scan_pak_files(dir, scan_past_stubs)
        .with_context(|| format!("Failed to scan {}", dir.display()))?;

    for path in &found {
        println!("{}", path.display());
    }
    println!("\nTotal: {} PAK layer(s)", found.len());
    Ok(())
}

fn cmd_hash(path: &str) {
    println!("hash32 (UTF-8 bytes): {:#010X}", hash32(path.as_bytes()));
    println!(
        "fingerprint UTF-16LE: {}",
        fingerprint(path, Encoding::Utf16Le)
    );
    println!("fingerprint UTF-8:    {}", fingerprint(path, Encoding::Utf8));
}

/// Simple glob matching for filtering.
fn glob_match(pattern: &str, name: &str) -> bool {
    let pattern_lower = pattern.to_lowercase();
    let name_lower = name.to_lowercase();

    if pattern_lower.contains('*') {
        let parts: Vec<&str> = pattern_lower.split('*').collect();
        let mut pos = 0;

        for (i, part) in parts.iter().enumerate() {
            if part.is_empty() {
                continue;
            }

            if let Some(found) = name_lower[pos..].find(part) {
                if i == 0 && found != 0 {
                    // First part must match at start if no leading *
                    return false;
                }
                pos += found + part.len();
            } else {
                return false;
            }
        }

        parts.last().map_or(true, |p| p.is_empty()) || pos == name_lower.len()
    } else {
        name_lower.contains(&pattern_lower)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_stops_at_stubs_by_default() {
        let cli = Cli::try_parse_from(["veles", "scan", "--dir", "game"]).unwrap();
        match cli.command {
            Commands::Scan {
                scan_past_stubs, ..
            } => assert!(!scan_past_stubs),
            _ => panic!("expected scan subcommand"),
        }

        let cli =
            Cli::try_parse_from(["veles", "scan", "--dir", "game", "--scan-past-stubs"]).unwrap();
        match cli.command {
            Commands::Scan {
                scan_past_stubs, ..
            } => assert!(scan_past_stubs),
            _ => panic!("expected scan subcommand"),
        }
    }

    #[test]
    fn test_glob_match() {
        assert!(glob_match("*.motlist", "player/pl0000.motlist"));
        assert!(glob_match("player/*", "player/pl0000.motlist"));
        assert!(glob_match("pl0000", "player/pl0000.motlist"));
        assert!(!glob_match("*.tex", "player/pl0000.motlist"));
    }
}
