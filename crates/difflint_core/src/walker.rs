//! Full-tree file discovery using the `ignore` crate.
//!
//! Backs the `--all` mode: instead of asking git what changed, walk the whole
//! project with `.gitignore` support and hand every file to classification.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use tracing::{debug, info};

/// Walks the project tree and returns every file, repo-relative and sorted.
///
/// Respects `.gitignore`, skips hidden files, does not follow symlinks.
pub fn discover_all(root: impl AsRef<Path>) -> Vec<PathBuf> {
    let root = root.as_ref();
    let mut files = Vec::new();

    for entry in WalkBuilder::new(root).build() {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_some_and(|ft| ft.is_file())
                    && let Ok(relative) = entry.path().strip_prefix(root)
                {
                    files.push(relative.to_path_buf());
                }
            }
            Err(e) => debug!("Walk error: {}", e),
        }
    }

    files.sort();
    info!("Discovered {} files", files.len());
    files
}
