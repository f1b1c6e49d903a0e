//! Changed-file detection via git.
//!
//! Asks git for the names of files that are modified in the working tree
//! and/or staged for commit, restricted to added/copied/modified/renamed
//! entries. Deleted files are never linted.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use crate::RunnerError;

/// Which side of the index to inspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeScope {
    /// Unstaged modifications only (`git diff`).
    WorkingTree,
    /// Staged modifications only (`git diff --cached`).
    Staged,
    /// Union of both.
    All,
}

/// Detects changed files in a git repository.
pub struct ChangeDetector {
    root: PathBuf,
}

/// Only additions, copies, modifications, and renames survive the filter.
const DIFF_FILTER: &str = "--diff-filter=ACMR";

impl ChangeDetector {
    /// Creates a detector bound to the given project root.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, RunnerError> {
        let root = root.as_ref().to_path_buf();

        if !root.join(".git").exists() {
            return Err(RunnerError::NotARepository(root.display().to_string()));
        }

        Ok(Self { root })
    }

    /// Returns the project root this detector is bound to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns changed files in the given scope, repo-relative, sorted and
    /// deduplicated. Paths that no longer exist on disk are dropped.
    pub fn changed_files(&self, scope: ChangeScope) -> Result<Vec<PathBuf>, RunnerError> {
        let mut names = BTreeSet::new();

        if matches!(scope, ChangeScope::WorkingTree | ChangeScope::All) {
            names.extend(self.diff_names(&["diff", "--name-only", DIFF_FILTER])?);
        }
        if matches!(scope, ChangeScope::Staged | ChangeScope::All) {
            names.extend(self.diff_names(&["diff", "--cached", "--name-only", DIFF_FILTER])?);
        }

        let files: Vec<PathBuf> = names
            .into_iter()
            .map(PathBuf::from)
            .filter(|path| self.root.join(path).is_file())
            .collect();

        info!("Detected {} changed files", files.len());
        Ok(files)
    }

    fn diff_names(&self, args: &[&str]) -> Result<Vec<String>, RunnerError> {
        let stdout = self.run_git(args)?;
        let names: Vec<String> = stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();

        debug!("git {:?} reported {} paths", args, names.len());
        Ok(names)
    }

    /// Runs a git command in the project root and returns stdout.
    fn run_git(&self, args: &[&str]) -> Result<String, RunnerError> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            Err(RunnerError::git(
                String::from_utf8_lossy(&output.stderr).to_string(),
            ))
        }
    }
}
