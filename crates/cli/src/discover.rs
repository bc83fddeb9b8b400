//! Input discovery: expands the command-line paths into the list of files to process.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use strip_comments::is_supported_path;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Directory names never descended into.
const SKIPPED_DIRS: &[&str] = &["node_modules"];

fn is_skipped(entry: &DirEntry) -> bool {
    if entry.depth() == 0 {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || (entry.file_type().is_dir() && SKIPPED_DIRS.iter().any(|d| name == *d))
}

/// Collect supported source files under `paths`.
///
/// Directories are walked recursively in file-name order, skipping hidden entries and
/// `node_modules`. Files named explicitly are kept if their extension is supported. Each file
/// appears once, in the order it was first found.
pub fn discover(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = Vec::new();
    let mut push = |path: &Path| {
        if !files.iter().any(|f| f == path) {
            files.push(path.to_path_buf());
        }
    };

    for root in paths {
        if !root.exists() {
            bail!("Path does not exist: {}", root.display());
        }

        if root.is_file() {
            if is_supported_path(root) {
                push(root);
            } else {
                debug!(path = %root.display(), "skipping unsupported file");
            }
            continue;
        }

        for entry in WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_skipped(e))
        {
            let entry = entry
                .with_context(|| format!("Failed to read directory entry under {}", root.display()))?;
            if entry.file_type().is_file() && is_supported_path(entry.path()) {
                push(entry.path());
            }
        }
    }

    debug!(count = files.len(), "discovered files");
    Ok(files)
}
