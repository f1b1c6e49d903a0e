//! Runner configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::RunnerError;

/// Configuration for the lint runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// External linter tools, in the order they are run.
    #[serde(default)]
    pub tools: Vec<ToolConfig>,

    /// Glob patterns (repo-relative) excluded from every candidate set.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Base directory for resolving relative paths.
    /// This is usually the directory containing the configuration file.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

/// One external linter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolConfig {
    /// Display name, also used in failure labels.
    pub name: String,

    /// File extensions handled by this tool (without the leading dot).
    pub extensions: Vec<String>,

    /// Binary to invoke. A path with a separator is resolved against the
    /// project root; a bare name is looked up on `PATH`.
    pub command: String,

    /// Arguments passed before the file paths.
    #[serde(default)]
    pub args: Vec<String>,

    /// Invoke the tool once per file instead of one batch invocation.
    #[serde(default)]
    pub per_file: bool,

    /// Strip a leading template header before linting (per-file mode only).
    #[serde(default)]
    pub strip_template_header: bool,

    /// Command suggested to the user when the binary is missing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_hint: Option<String>,
}

impl ToolConfig {
    /// Returns whether this tool handles the given file, by extension.
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }
}

impl RunnerConfig {
    /// Config file names probed by [`RunnerConfig::discover`], in order.
    pub const CONFIG_FILES: [&'static str; 2] = [".difflint.jsonc", ".difflint.json"];

    /// Creates the built-in configuration: a batch style checker for PHP and
    /// a per-file JS linter with template-header stripping.
    pub fn new() -> Self {
        Self {
            tools: vec![
                ToolConfig {
                    name: "phpcs".to_string(),
                    extensions: vec!["php".to_string()],
                    command: "vendor/bin/phpcs".to_string(),
                    args: vec!["--standard=config/phpcs.xml".to_string()],
                    per_file: false,
                    strip_template_header: false,
                    install_hint: Some("composer install".to_string()),
                },
                ToolConfig {
                    name: "eslint".to_string(),
                    extensions: vec!["js".to_string()],
                    command: "node_modules/.bin/eslint".to_string(),
                    args: vec![
                        "-c".to_string(),
                        "config/.eslintrc.json".to_string(),
                        "--format".to_string(),
                        "unix".to_string(),
                    ],
                    per_file: true,
                    strip_template_header: true,
                    install_hint: Some("npm install".to_string()),
                },
            ],
            exclude: Vec::new(),
            base_dir: None,
        }
    }

    /// Loads configuration from a file.
    ///
    /// Supports `.difflint.jsonc`, `.difflint.json`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RunnerError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| RunnerError::config(format!("Failed to read config: {}", e)))?;

        let mut config = Self::from_json(&content)?;

        if let Some(parent) = path.parent() {
            config.base_dir = Some(parent.to_path_buf());
        }

        Ok(config)
    }

    /// Parses configuration from a JSONC string.
    pub fn from_json(json: &str) -> Result<Self, RunnerError> {
        let value = jsonc_parser::parse_to_serde_value(json, &Default::default())
            .map_err(|e| RunnerError::config(format!("Invalid JSON: {}", e)))?
            .ok_or_else(|| RunnerError::config("Config is empty"))?;

        let config: Self = serde_json::from_value(value)
            .map_err(|e| RunnerError::config(format!("Invalid config: {}", e)))?;

        for tool in &config.tools {
            if tool.extensions.is_empty() {
                return Err(RunnerError::config(format!(
                    "Tool '{}' has no extensions",
                    tool.name
                )));
            }
            if tool.strip_template_header && !tool.per_file {
                return Err(RunnerError::config(format!(
                    "Tool '{}': strip_template_header requires per_file",
                    tool.name
                )));
            }
        }

        Ok(config)
    }

    /// Looks for a config file in the given directory.
    pub fn discover(dir: impl AsRef<Path>) -> Option<PathBuf> {
        let dir = dir.as_ref();
        Self::CONFIG_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.is_file())
    }

    /// Returns the tools handling the given file.
    pub fn tools_for(&self, path: &Path) -> impl Iterator<Item = &ToolConfig> {
        self.tools.iter().filter(move |t| t.matches(path))
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self::new()
    }
}
