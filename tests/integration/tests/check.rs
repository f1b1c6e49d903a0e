//! Integration tests for the `check` and `files` commands.
//!
//! Each test builds a throwaway git repository with fake linter scripts and
//! drives the built binary end to end.

#![cfg(unix)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn dlint_cmd() -> Command {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let workspace_root = manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("Failed to find workspace root");
    let bin_path = workspace_root.join("target/debug/dlint");
    Command::new(bin_path)
}

fn git(root: &Path, args: &[&str]) {
    let output = std::process::Command::new("git")
        .args(args)
        .current_dir(root)
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

fn write_script(root: &Path, name: &str, body: &str) -> PathBuf {
    let path = root.join(name);
    fs::write(&path, body).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

const FAILING_LINTER: &str =
    "#!/bin/sh\nfor f in \"$@\"; do echo \"$f:2:1: fake finding\"; done\nexit 1\n";
const PASSING_LINTER: &str = "#!/bin/sh\nexit 0\n";

/// Repo with a config wiring `.php` to a passing fake and `.js` to a failing
/// fake (per-file, header stripping on).
fn fixture_repo(js_linter_body: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    git(root, &["init"]);
    git(root, &["config", "user.email", "test@test.invalid"]);
    git(root, &["config", "user.name", "Test"]);

    let pass = write_script(root, "style.sh", PASSING_LINTER);
    let js = write_script(root, "jslint.sh", js_linter_body);

    let config = format!(
        r#"{{
  "tools": [
    {{
      "name": "style",
      "extensions": ["php"],
      "command": {pass:?}
    }},
    {{
      "name": "jslint",
      "extensions": ["js"],
      "command": {js:?},
      "per_file": true,
      "strip_template_header": true
    }}
  ],
  "exclude": ["*.sh", ".difflint.jsonc"]
}}
"#,
        pass = pass.to_str().unwrap(),
        js = js.to_str().unwrap()
    );
    fs::write(root.join(".difflint.jsonc"), config).unwrap();

    fs::write(root.join(".keep"), "").unwrap();
    git(root, &["add", ".keep"]);
    git(root, &["commit", "-m", "initial"]);

    temp
}

#[test]
fn check_with_no_changes_passes() {
    let repo = fixture_repo(FAILING_LINTER);

    dlint_cmd()
        .current_dir(repo.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("No files to validate"));
}

#[test]
fn check_reports_remapped_line_numbers() {
    let repo = fixture_repo(FAILING_LINTER);
    let root = repo.path();

    fs::create_dir_all(root.join("public/js")).unwrap();
    fs::write(
        root.join("public/js/legacy.js"),
        "<?php\n$config = load();\n?>\nvar legacy = true;\nbad();\n",
    )
    .unwrap();
    git(root, &["add", "public/js/legacy.js"]);

    dlint_cmd()
        .current_dir(root)
        .arg("check")
        .arg("--staged")
        .assert()
        .code(1)
        // The fake linter flags line 2 of the stripped file; the 3-line
        // header puts the finding on line 5 of the original.
        .stdout(predicate::str::contains(
            "public/js/legacy.js:5:1: fake finding",
        ))
        .stdout(predicate::str::contains("LINT FAILED"))
        .stdout(predicate::str::contains("- jslint: public/js/legacy.js"));
}

#[test]
fn check_passes_when_linters_pass() {
    let repo = fixture_repo(PASSING_LINTER);
    let root = repo.path();

    fs::write(root.join("app.js"), "var app = 1;\n").unwrap();
    fs::write(root.join("index.php"), "<?php\n").unwrap();
    git(root, &["add", "app.js", "index.php"]);

    dlint_cmd()
        .current_dir(root)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("LINT PASSED"))
        .stdout(predicate::str::contains("Checking 2 files"));
}

#[test]
fn check_staged_ignores_working_tree_edits() {
    let repo = fixture_repo(FAILING_LINTER);
    let root = repo.path();

    // Commit a file, then edit it without staging: --staged must not see it.
    fs::write(root.join("tracked.js"), "var t;\n").unwrap();
    git(root, &["add", "tracked.js"]);
    git(root, &["commit", "-m", "add tracked.js"]);
    fs::write(root.join("tracked.js"), "var t = 2;\n").unwrap();

    dlint_cmd()
        .current_dir(root)
        .arg("check")
        .arg("--staged")
        .assert()
        .success()
        .stdout(predicate::str::contains("No files to validate"));
}

#[test]
fn check_json_format_is_parseable() {
    let repo = fixture_repo(FAILING_LINTER);
    let root = repo.path();

    fs::write(root.join("bad.js"), "var b;\nbad();\n").unwrap();
    git(root, &["add", "bad.js"]);

    let output = dlint_cmd()
        .current_dir(root)
        .args(["check", "--staged", "--format", "json"])
        .assert()
        .code(1)
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["total_files"], 1);
    assert_eq!(report["reports"][0]["tool"], "jslint");
    assert_eq!(report["reports"][0]["outcomes"][0]["passed"], false);
}

#[test]
fn check_unknown_format_fails_before_linting() {
    // This fake linter leaves a marker file when invoked.
    let repo = fixture_repo(
        "#!/bin/sh\ntouch \"$(dirname \"$0\")/linter_ran\"\nexit 0\n",
    );
    let root = repo.path();

    fs::write(root.join("pending.js"), "var p;\n").unwrap();
    git(root, &["add", "pending.js"]);

    dlint_cmd()
        .current_dir(root)
        .args(["check", "--format", "yaml"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown format"));

    // The format was rejected before any linter was spawned.
    assert!(!root.join("linter_ran").exists());
}

#[test]
fn check_all_lints_unchanged_files() {
    let repo = fixture_repo(FAILING_LINTER);
    let root = repo.path();

    // Committed, so invisible to change detection.
    fs::write(root.join("committed.js"), "var c;\nbad();\n").unwrap();
    git(root, &["add", "committed.js"]);
    git(root, &["commit", "-m", "add js"]);

    dlint_cmd()
        .current_dir(root)
        .args(["check", "--all"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("committed.js:2:1: fake finding"));

    dlint_cmd()
        .current_dir(root)
        .arg("check")
        .assert()
        .success();
}

#[test]
fn check_outside_a_repository_fails_cleanly() {
    let temp = TempDir::new().unwrap();

    dlint_cmd()
        .current_dir(temp.path())
        .arg("check")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Not a git repository"));
}

#[test]
fn files_lists_candidates_without_linting() {
    let repo = fixture_repo(FAILING_LINTER);
    let root = repo.path();

    fs::write(root.join("pending.js"), "var p;\n").unwrap();
    git(root, &["add", "pending.js"]);

    dlint_cmd()
        .current_dir(root)
        .arg("files")
        .assert()
        .success()
        .stdout(predicate::str::contains("pending.js"))
        .stdout(predicate::str::contains("fake finding").not());
}
