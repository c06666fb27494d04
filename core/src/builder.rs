use crate::html::strip_html;
use crate::index::InvertedIndex;
use crate::queue::WorkQueue;
use crate::shared::SharedIndex;
use crate::tokenizer::parse_words;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// Collects every `.htm`/`.html` file (case-insensitive) under `root`,
/// recursively, in sorted order. Unreadable entries are logged and
/// skipped.
pub fn traverse(root: &Path) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                tracing::warn!(%error, "skipping unreadable entry");
                continue;
            }
        };
        if entry.file_type().is_file() && is_html(entry.path()) {
            paths.push(entry.into_path());
        }
    }
    paths
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
}

/// Reads one HTML file into `index` under its path string, positions
/// starting at 1.
pub fn build_file(path: &Path, index: &mut InvertedIndex) -> Result<()> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let words = parse_words(&strip_html(&raw));
    index.add_all(&words, &path.to_string_lossy(), 1);
    Ok(())
}

/// Indexes every path in order on the calling thread. A file that
/// cannot be read is reported and skipped, never aborting the build.
pub fn build_index(paths: &[PathBuf], index: &mut InvertedIndex) {
    for path in paths {
        if let Err(error) = build_file(path, index) {
            tracing::warn!(%error, "skipping file");
        }
    }
}

/// Indexes every path across the pool. Each task parses its document
/// into a local index lock-free and takes the write lock once, for a
/// single merge. Blocks until all submitted documents are done.
pub fn build_index_threaded(paths: &[PathBuf], index: &Arc<SharedIndex>, queue: &WorkQueue) {
    for path in paths {
        let path = path.clone();
        let index = index.clone();
        queue.execute(move || {
            let mut local = InvertedIndex::new();
            match build_file(&path, &mut local) {
                Ok(()) => index.merge(local),
                Err(error) => tracing::warn!(%error, "skipping file"),
            }
        });
    }
    queue.finish();
}
