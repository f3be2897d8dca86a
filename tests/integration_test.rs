// tests/integration_test.rs
use std::io::Write;
use std::process::{Command, Output};
use tempfile::NamedTempFile;

const FULL_FIXTURE: &str = "tests/fixtures/gitrelease_full.toml";

/// Empty config file so a config in the user's home cannot leak in
fn empty_config() -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Could not create temp file");
    file.write_all(b"").expect("Could not write config");
    file
}

fn run(config: &str, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_git-release-manager"))
        .args(["--config", config])
        .args(args)
        .env_remove("GITHUB_TOKEN")
        .env_remove("GH_TOKEN")
        .output()
        .expect("Failed to execute command")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn test_help() {
    let output = Command::new(env!("CARGO_BIN_EXE_git-release-manager"))
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("git-release-manager"));
    assert!(text.contains("create-rc"));
    assert!(text.contains("promote"));
    assert!(text.contains("patch"));
}

#[test]
fn test_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_git-release-manager"))
        .arg("--version")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    assert!(stdout(&output).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_info_against_semver_fixture() {
    let config = empty_config();
    let output = run(config.path().to_str().unwrap(), &["--mock", "semver", "info"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("goodreleaser/repo_sem_ver"));
    assert!(text.contains("rc-1.2.3"));
}

#[test]
fn test_dry_run_create_rc_shows_plan() {
    let config = empty_config();
    let output = run(
        config.path().to_str().unwrap(),
        &["--mock", "semver", "--dry-run", "create-rc", "--bump", "major"],
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("rc-2.0.0"));
    assert!(text.contains("Dry run"));
    // Cutting over an unpromoted candidate is allowed but flagged
    assert!(stderr(&output).contains("never promoted"));
}

#[test]
fn test_forced_promote_runs_workflow() {
    let config = empty_config();
    let output = run(config.path().to_str().unwrap(), &["--mock", "semver", "--force", "promote"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("Released version-1.2.3"));
}

#[test]
fn test_patch_without_release_fails() {
    let config = empty_config();
    let output = run(
        config.path().to_str().unwrap(),
        &["--mock", "empty", "--force", "patch", "--commit", "abcdef1"],
    );

    assert!(!output.status.success());
    assert!(stderr(&output).contains("ERROR"));
}

#[test]
fn test_omitted_feature_is_refused() {
    let output = run(
        FULL_FIXTURE,
        &["--mock", "semver", "--force", "patch", "--commit", "abcdef1"],
    );

    assert!(!output.status.success());
    assert!(stderr(&output).contains("disabled by configuration"));
}

#[test]
fn test_owners_listing() {
    let config = empty_config();
    let output = run(config.path().to_str().unwrap(), &["--mock", "empty", "owners"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("goodreleaser"));
}

#[test]
fn test_repos_listing_from_fixture() {
    let config = empty_config();
    let output = run(config.path().to_str().unwrap(), &["--mock", "semver", "repos", "goodreleaser"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("repo_sem_ver"));
    assert!(text.contains("repo_cal_ver"));
}
