//! DiffLint CLI
//!
//! Runs the configured linters over files changed in version control.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use difflint_core::{ChangeScope, FileSelection, LintRunner, RunReport, RunnerConfig};

/// DiffLint - lint only the files your working copy touched
#[derive(Parser)]
#[command(name = "dlint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Lint changed files
    Check {
        /// Only staged files
        #[arg(long, conflicts_with_all = ["working_tree", "all"])]
        staged: bool,

        /// Only unstaged files
        #[arg(long, conflicts_with = "all")]
        working_tree: bool,

        /// Every file in the tree, not just changed ones
        #[arg(long)]
        all: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// List the files that would be linted
    Files {
        /// Only staged files
        #[arg(long, conflicts_with_all = ["working_tree", "all"])]
        staged: bool,

        /// Only unstaged files
        #[arg(long, conflicts_with = "all")]
        working_tree: bool,

        /// Every file in the tree, not just changed ones
        #[arg(long)]
        all: bool,
    },

    /// Initialize configuration
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(has_errors) => {
            if has_errors {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            error!("{:?}", e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<bool> {
    match &cli.command {
        Commands::Check {
            staged,
            working_tree,
            all,
            format,
        } => run_check(
            &cli,
            selection_from_flags(*staged, *working_tree, *all),
            format,
        ),
        Commands::Files {
            staged,
            working_tree,
            all,
        } => run_files(&cli, selection_from_flags(*staged, *working_tree, *all)).map(|_| false),
        Commands::Init { force } => run_init(*force).map(|_| false),
    }
}

/// Maps the scope flags onto a selection. The default matches the original
/// pre-commit use: union of staged and unstaged changes.
fn selection_from_flags(staged: bool, working_tree: bool, all: bool) -> FileSelection {
    if all {
        FileSelection::Everything
    } else if staged {
        FileSelection::Changed(ChangeScope::Staged)
    } else if working_tree {
        FileSelection::Changed(ChangeScope::WorkingTree)
    } else {
        FileSelection::Changed(ChangeScope::All)
    }
}

/// Loads config and builds the runner rooted at the config's directory
/// (current directory when no config file exists).
fn build_runner(cli: &Cli) -> Result<LintRunner> {
    let config = if let Some(ref path) = cli.config {
        RunnerConfig::from_file(path).into_diagnostic()?
    } else {
        find_config()?
    };

    let root = config
        .base_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));

    LintRunner::new(config, root).into_diagnostic()
}

fn find_config() -> Result<RunnerConfig> {
    if let Some(path) = RunnerConfig::discover(".") {
        info!("Using config: {}", path.display());
        return RunnerConfig::from_file(&path).into_diagnostic();
    }

    info!("No config file found, using defaults");
    Ok(RunnerConfig::new())
}

fn run_check(cli: &Cli, selection: FileSelection, format: &str) -> Result<bool> {
    // Reject a bad format before any linter runs.
    if !matches!(format, "text" | "json") {
        return Err(miette::miette!("Unknown format: {}", format));
    }

    let runner = build_runner(cli)?;
    let report = runner.run(selection).into_diagnostic()?;

    match format {
        "json" => {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).into_diagnostic()?
            );
        }
        _ => print!("{}", render_text(&report)),
    }

    Ok(!report.passed())
}

fn run_files(cli: &Cli, selection: FileSelection) -> Result<()> {
    let runner = build_runner(cli)?;
    let candidates = runner.candidates(selection).into_diagnostic()?;

    for file in candidates {
        println!("{}", file.display());
    }

    Ok(())
}

/// Renders the text report: per-tool sections with the linter output, then a
/// pass/fail summary naming everything that failed.
fn render_text(report: &RunReport) -> String {
    use std::fmt::Write;

    let mut out = String::new();

    if report.total_files == 0 {
        out.push_str("No files to validate\n");
        return out;
    }

    writeln!(out, "Checking {} files", report.total_files).unwrap();

    for tool_report in &report.reports {
        writeln!(out).unwrap();
        writeln!(
            out,
            "{} ({} files)",
            tool_report.tool,
            tool_report.file_count()
        )
        .unwrap();

        for outcome in &tool_report.outcomes {
            for file in &outcome.files {
                writeln!(out, "  - {}", file.display()).unwrap();
            }
            for line in &outcome.output {
                writeln!(out, "    {}", line).unwrap();
            }
        }
    }

    writeln!(out).unwrap();
    if report.passed() {
        writeln!(out, "LINT PASSED").unwrap();
        writeln!(out, "All checked files passed validation.").unwrap();
    } else {
        writeln!(out, "LINT FAILED").unwrap();
        writeln!(out, "Files with errors:").unwrap();
        for label in report.failures() {
            writeln!(out, "  - {}", label).unwrap();
        }
        writeln!(out, "Please fix the errors before committing.").unwrap();
    }

    out
}

const DEFAULT_CONFIG: &str = r#"{
  // Linters run over changed files, in order. A file is handed to every
  // tool whose extension list matches it.
  "tools": [
    {
      "name": "phpcs",
      "extensions": ["php"],
      "command": "vendor/bin/phpcs",
      "args": ["--standard=config/phpcs.xml"],
      "install_hint": "composer install"
    },
    {
      "name": "eslint",
      "extensions": ["js"],
      "command": "node_modules/.bin/eslint",
      "args": ["-c", "config/.eslintrc.json", "--format", "unix"],
      "per_file": true,
      "strip_template_header": true,
      "install_hint": "npm install"
    }
  ],
  "exclude": []
}
"#;

fn run_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(RunnerConfig::CONFIG_FILES[0]);

    loop {
        let mut options = std::fs::OpenOptions::new();
        options.write(true).create_new(true);

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.custom_flags(libc::O_NOFOLLOW);
        }

        match options.open(&config_path) {
            Ok(mut file) => {
                use std::io::Write;
                file.write_all(DEFAULT_CONFIG.as_bytes()).into_diagnostic()?;
                info!("Created {}", config_path.display());
                return Ok(());
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                if !force {
                    return Err(miette::miette!(
                        "Config file already exists. Use --force to overwrite."
                    ));
                }

                // If force is enabled, remove the existing file or symlink and retry.
                // Re-check existence to avoid infinite loop if removal fails for other reasons.
                if std::fs::symlink_metadata(&config_path).is_ok() {
                    std::fs::remove_file(&config_path).into_diagnostic()?;
                }
            }
            Err(e) => return Err(e).into_diagnostic(),
        }
    }
}
