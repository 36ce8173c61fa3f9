//! Candidate file discovery
//!
//! Walks each configured root once at startup. Entries whose name or
//! root-relative path matches an ignore glob are pruned (directories are not
//! descended into), and when shebangs are configured only files whose first
//! line equals one of them are kept.

use crate::utils::first_line;
use crate::utils::progress::{ProgressBar, ProgressStyle};
use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Longest first line read when checking for a shebang
const MAX_SHEBANG_LEN: u64 = 4096;

/// Default glob patterns excluded from the walk
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    ".git",
    "venv",
    "node_modules",
    "bower_components",
    "*.png",
    "*.jpg",
    "*.jpeg",
    "*.pyc",
];

/// What to walk and what to keep
#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    pub dirs: Vec<PathBuf>,
    /// Accepted first lines; empty accepts every file
    pub shebangs: Vec<String>,
    pub ignore: Vec<String>,
}

/// Build a glob set from ignore patterns
pub fn build_ignore_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).with_context(|| format!("Invalid ignore pattern: {pattern}"))?;
        builder.add(glob);
    }
    builder.build().context("Failed to build ignore patterns")
}

/// Whether `path` (under `root`) is excluded by `ignore`
fn is_ignored(ignore: &GlobSet, root: &Path, path: &Path) -> bool {
    if path == root {
        return false;
    }
    if let Some(name) = path.file_name()
        && ignore.is_match(Path::new(name))
    {
        return true;
    }
    path.strip_prefix(root)
        .map(|rel| ignore.is_match(rel))
        .unwrap_or(false)
}

/// Whether the file's first line is one of `shebangs`.
///
/// Only the first line counts: a matching line further down does not admit
/// the file.
fn has_shebang(path: &Path, shebangs: &[String]) -> bool {
    if shebangs.is_empty() {
        return true;
    }

    let Ok(file) = File::open(path) else {
        return false;
    };
    let mut buf = Vec::new();
    if BufReader::new(file.take(MAX_SHEBANG_LEN))
        .read_until(b'\n', &mut buf)
        .is_err()
    {
        return false;
    }

    let line = String::from_utf8_lossy(first_line(&buf));
    let line = line.trim();
    shebangs.iter().any(|s| s.trim() == line)
}

/// Enumerate candidate files under every root, in walk order.
///
/// Traversal errors are reported and skipped; unaffected subtrees are still
/// walked. Paths reachable from more than one root appear once.
pub fn collect_candidates(options: &WalkOptions, show_progress: bool) -> Result<Vec<PathBuf>> {
    let ignore = build_ignore_set(&options.ignore)?;

    let spinner = if show_progress {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.enable_steady_tick(Duration::from_millis(80));
        Some(spinner)
    } else {
        None
    };

    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for root in &options.dirs {
        if let Some(ref spinner) = spinner {
            spinner.set_message(format!("Finding files to search in {}", root.display()));
        }

        let root_for_filter = root.clone();
        let ignore_for_filter = ignore.clone();
        let walker = WalkBuilder::new(root)
            .standard_filters(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| !is_ignored(&ignore_for_filter, &root_for_filter, entry.path()))
            .build();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(root = %root.display(), error = %e, "error walking path");
                    if let Some(ref spinner) = spinner {
                        spinner.println(format!("error walking {}: {}", root.display(), e));
                    }
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let path = entry.into_path();
            if !has_shebang(&path, &options.shebangs) {
                continue;
            }
            if seen.insert(path.clone()) {
                candidates.push(path);
            }
        }
    }

    if let Some(spinner) = spinner {
        spinner.finish_with_message(format!("Found {} files to search", candidates.len()));
    }
    info!(files = candidates.len(), "collected candidate files");

    Ok(candidates)
}
