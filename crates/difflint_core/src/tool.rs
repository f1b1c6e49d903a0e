//! External linter invocation.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use crate::RunnerError;
use crate::config::ToolConfig;
use crate::report::LintOutcome;
use crate::template::{remap_line, strip_template_header};

/// Classifies candidate files into per-tool lists, preserving input order.
///
/// A file matching several tools appears in every matching list; files
/// matching none are dropped.
pub fn partition<'a>(
    tools: &'a [ToolConfig],
    files: &[PathBuf],
) -> Vec<(&'a ToolConfig, Vec<PathBuf>)> {
    tools
        .iter()
        .map(|tool| {
            let matching: Vec<PathBuf> = files
                .iter()
                .filter(|f| tool.matches(f))
                .cloned()
                .collect();
            (tool, matching)
        })
        .collect()
}

/// Runs one configured tool over a set of files.
pub struct ToolRunner<'a> {
    tool: &'a ToolConfig,
    root: &'a Path,
}

impl<'a> ToolRunner<'a> {
    /// Creates a runner for the given tool, rooted at the project directory.
    pub fn new(tool: &'a ToolConfig, root: &'a Path) -> Self {
        Self { tool, root }
    }

    /// Runs the tool and returns one outcome per invocation.
    pub fn run(&self, files: &[PathBuf]) -> Result<Vec<LintOutcome>, RunnerError> {
        let command = self.resolve_command()?;
        info!("Running {} on {} files", self.tool.name, files.len());

        if self.tool.per_file {
            files
                .iter()
                .map(|file| self.run_single(&command, file))
                .collect()
        } else {
            Ok(vec![self.run_batch(&command, files)?])
        }
    }

    /// Resolves the configured command. A command containing a path
    /// separator is taken relative to the project root and must exist;
    /// a bare name is left for `PATH` lookup.
    fn resolve_command(&self) -> Result<PathBuf, RunnerError> {
        let command = Path::new(&self.tool.command);

        if command.components().count() > 1 {
            let resolved = if command.is_absolute() {
                command.to_path_buf()
            } else {
                self.root.join(command)
            };
            if !resolved.is_file() {
                return Err(RunnerError::tool_missing(
                    &self.tool.name,
                    &self.tool.command,
                    self.tool.install_hint.as_deref(),
                ));
            }
            Ok(resolved)
        } else {
            Ok(command.to_path_buf())
        }
    }

    fn run_batch(&self, command: &Path, files: &[PathBuf]) -> Result<LintOutcome, RunnerError> {
        let paths: Vec<PathBuf> = files.iter().map(|f| self.root.join(f)).collect();
        let (passed, output) = self.invoke(command, &paths)?;

        if passed {
            Ok(LintOutcome::pass(files.to_vec()))
        } else {
            Ok(LintOutcome::fail(files.to_vec(), output))
        }
    }

    fn run_single(&self, command: &Path, file: &Path) -> Result<LintOutcome, RunnerError> {
        let full_path = self.root.join(file);

        // Lint a header-stripped copy when the file opens with a template
        // block, then shift reported line numbers back. Files that are not
        // valid UTF-8 cannot carry a detectable header; lint them in place.
        let stripped = if self.tool.strip_template_header {
            match String::from_utf8(std::fs::read(&full_path)?) {
                Ok(content) => strip_template_header(&content),
                Err(_) => {
                    debug!("{}: not valid UTF-8, linting in place", file.display());
                    None
                }
            }
        } else {
            None
        };

        let (passed, output) = match stripped {
            Some(stripped) => {
                debug!(
                    "{}: template header ({} lines) stripped before linting",
                    file.display(),
                    stripped.offset
                );

                let suffix = file
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(|e| format!(".{e}"))
                    .unwrap_or_default();
                let mut temp = tempfile::Builder::new()
                    .prefix("difflint_")
                    .suffix(&suffix)
                    .tempfile()?;
                temp.write_all(stripped.content.as_bytes())?;
                temp.flush()?;

                let (passed, raw) = self.invoke(command, &[temp.path().to_path_buf()])?;
                let remapped = raw
                    .iter()
                    .map(|line| remap_line(line, temp.path(), file, stripped.offset))
                    .collect();
                (passed, remapped)
            }
            None => self.invoke(command, &[full_path])?,
        };

        if passed {
            Ok(LintOutcome::pass(vec![file.to_path_buf()]))
        } else {
            Ok(LintOutcome::fail(vec![file.to_path_buf()], output))
        }
    }

    /// Spawns the tool and collects its exit status and output lines
    /// (stdout then stderr, trailing blank lines dropped).
    fn invoke(&self, command: &Path, paths: &[PathBuf]) -> Result<(bool, Vec<String>), RunnerError> {
        let result = Command::new(command)
            .args(&self.tool.args)
            .args(paths)
            .current_dir(self.root)
            .output();

        let output = match result {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RunnerError::tool_missing(
                    &self.tool.name,
                    &self.tool.command,
                    self.tool.install_hint.as_deref(),
                ));
            }
            Err(e) => return Err(RunnerError::tool(&self.tool.name, e.to_string())),
        };

        let mut lines: Vec<String> = String::from_utf8_lossy(&output.stdout)
            .lines()
            .chain(String::from_utf8_lossy(&output.stderr).lines())
            .map(String::from)
            .collect();
        while lines.last().is_some_and(|l| l.trim().is_empty()) {
            lines.pop();
        }

        Ok((output.status.success(), lines))
    }
}
