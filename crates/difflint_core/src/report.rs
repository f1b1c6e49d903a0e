//! Lint run results.

use std::path::PathBuf;

use serde::Serialize;

/// Result of a single linter invocation.
#[derive(Debug, Clone, Serialize)]
pub struct LintOutcome {
    /// Files covered by this invocation (one for per-file tools).
    pub files: Vec<PathBuf>,
    /// Whether the tool exited successfully.
    pub passed: bool,
    /// Remapped tool output; empty when the invocation passed.
    pub output: Vec<String>,
}

impl LintOutcome {
    /// Creates a passing outcome for the given files.
    pub fn pass(files: Vec<PathBuf>) -> Self {
        Self {
            files,
            passed: true,
            output: Vec::new(),
        }
    }

    /// Creates a failing outcome carrying the tool's output.
    pub fn fail(files: Vec<PathBuf>, output: Vec<String>) -> Self {
        Self {
            files,
            passed: false,
            output,
        }
    }
}

/// All outcomes produced by one tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolReport {
    /// Tool name from the configuration.
    pub tool: String,
    /// Whether the tool was invoked once per file (false: one batch call).
    pub per_file: bool,
    /// One entry per invocation.
    pub outcomes: Vec<LintOutcome>,
}

impl ToolReport {
    /// Returns whether every invocation of this tool passed.
    pub fn passed(&self) -> bool {
        self.outcomes.iter().all(|o| o.passed)
    }

    /// Number of files this tool looked at.
    pub fn file_count(&self) -> usize {
        self.outcomes.iter().map(|o| o.files.len()).sum()
    }
}

/// Aggregated result of a full run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Number of candidate files after exclusion filtering.
    pub total_files: usize,
    /// Per-tool reports, in configuration order.
    pub reports: Vec<ToolReport>,
}

impl RunReport {
    /// Creates an empty passing report.
    pub fn empty() -> Self {
        Self {
            total_files: 0,
            reports: Vec::new(),
        }
    }

    /// Returns whether every tool passed.
    pub fn passed(&self) -> bool {
        self.reports.iter().all(ToolReport::passed)
    }

    /// Human labels for everything that failed: the tool name for a failed
    /// batch invocation, `tool: path` for each failed per-file invocation.
    pub fn failures(&self) -> Vec<String> {
        let mut labels = Vec::new();
        for report in &self.reports {
            for outcome in &report.outcomes {
                if outcome.passed {
                    continue;
                }
                match (report.per_file, outcome.files.first()) {
                    (true, Some(file)) => {
                        labels.push(format!("{}: {}", report.tool, file.display()));
                    }
                    _ => labels.push(report.tool.clone()),
                }
            }
        }
        labels
    }
}
