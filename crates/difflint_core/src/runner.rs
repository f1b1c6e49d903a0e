//! Lint run orchestration.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::{debug, info};

use crate::RunnerError;
use crate::changes::{ChangeDetector, ChangeScope};
use crate::config::RunnerConfig;
use crate::report::{RunReport, ToolReport};
use crate::tool::{ToolRunner, partition};
use crate::walker;

/// How candidate files are selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSelection {
    /// Files reported as changed by git, in the given scope.
    Changed(ChangeScope),
    /// Every file in the tree (gitignore-aware walk).
    Everything,
}

/// Orchestrates a lint run: select files, filter, classify, run tools.
pub struct LintRunner {
    config: RunnerConfig,
    root: PathBuf,
    exclude: Option<GlobSet>,
}

impl LintRunner {
    /// Creates a runner for the given project root.
    pub fn new(config: RunnerConfig, root: impl AsRef<Path>) -> Result<Self, RunnerError> {
        let exclude = build_globset(&config.exclude)?;

        Ok(Self {
            config,
            root: root.as_ref().to_path_buf(),
            exclude,
        })
    }

    /// Returns the candidate files for a selection, after exclusion
    /// filtering. Paths are repo-relative and sorted.
    pub fn candidates(&self, selection: FileSelection) -> Result<Vec<PathBuf>, RunnerError> {
        let files = match selection {
            FileSelection::Changed(scope) => {
                ChangeDetector::new(&self.root)?.changed_files(scope)?
            }
            FileSelection::Everything => walker::discover_all(&self.root),
        };

        let candidates: Vec<PathBuf> = files
            .into_iter()
            .filter(|f| !self.is_excluded(f))
            .collect();

        debug!("{} candidate files after exclusion", candidates.len());
        Ok(candidates)
    }

    /// Runs every configured tool over the selected files.
    pub fn run(&self, selection: FileSelection) -> Result<RunReport, RunnerError> {
        let candidates = self.candidates(selection)?;
        self.run_files(&candidates)
    }

    /// Runs every configured tool over an explicit candidate list.
    pub fn run_files(&self, candidates: &[PathBuf]) -> Result<RunReport, RunnerError> {
        if candidates.is_empty() {
            info!("No files to lint");
            return Ok(RunReport::empty());
        }

        let mut reports = Vec::new();

        for (tool, files) in partition(&self.config.tools, candidates) {
            if files.is_empty() {
                continue;
            }

            let outcomes = ToolRunner::new(tool, &self.root).run(&files)?;
            reports.push(ToolReport {
                tool: tool.name.clone(),
                per_file: tool.per_file,
                outcomes,
            });
        }

        Ok(RunReport {
            total_files: candidates.len(),
            reports,
        })
    }

    fn is_excluded(&self, path: &Path) -> bool {
        self.exclude.as_ref().is_some_and(|set| set.is_match(path))
    }

    /// Returns the configuration in use.
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }
}

fn build_globset(patterns: &[String]) -> Result<Option<GlobSet>, RunnerError> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|e| RunnerError::config(format!("Invalid glob pattern '{pattern}': {e}")))?;
        builder.add(glob);
    }

    let set = builder
        .build()
        .map_err(|e| RunnerError::config(format!("Failed to build exclude set: {e}")))?;

    Ok(Some(set))
}
