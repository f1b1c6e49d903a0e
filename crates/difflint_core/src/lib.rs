//! # difflint_core
//!
//! Core engine for DiffLint.
//!
//! This crate provides:
//! - Change detection via git status
//! - Extension-based classification of files into linter tools
//! - Template-header stripping and line-number remapping for mixed files
//! - External tool invocation and result aggregation
//!
//! ## Example
//!
//! ```rust,ignore
//! use difflint_core::{ChangeScope, FileSelection, LintRunner, RunnerConfig};
//!
//! let config = RunnerConfig::discover(".")
//!     .map(RunnerConfig::from_file)
//!     .transpose()?
//!     .unwrap_or_default();
//! let runner = LintRunner::new(config, ".")?;
//!
//! let report = runner.run(FileSelection::Changed(ChangeScope::All))?;
//! if !report.passed() {
//!     for label in report.failures() {
//!         eprintln!("failed: {label}");
//!     }
//! }
//! ```

mod changes;
mod config;
mod error;
mod report;
mod runner;
pub mod template;
mod tool;
pub mod walker;

pub use changes::{ChangeDetector, ChangeScope};
pub use config::{RunnerConfig, ToolConfig};
pub use error::RunnerError;
pub use report::{LintOutcome, RunReport, ToolReport};
pub use runner::{FileSelection, LintRunner};
pub use template::{StrippedSource, remap_line, strip_template_header};
pub use tool::{ToolRunner, partition};
