//! CLI integration tests for courier
//!
//! Tests the courier CLI commands end-to-end using assert_cmd. Every test gets
//! its own config and data directories, and the API points at a closed port.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

struct Env {
    config: TempDir,
    data: TempDir,
}

impl Env {
    fn new() -> Self {
        Self {
            config: TempDir::new().unwrap(),
            data: TempDir::new().unwrap(),
        }
    }

    #[allow(deprecated)]
    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("courier").unwrap();
        cmd.env("COURIER_CONFIG_DIR", self.config.path());
        cmd.env("COURIER_DATA_PATH", self.data.path());
        cmd.env("COURIER_API_URL", "http://127.0.0.1:1");
        cmd.env("RUST_LOG", "off");
        cmd
    }

    fn login(&self) {
        self.cmd()
            .args(["login", "--session-id", "sess_1", "--account-id", "acct_1"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Logged in."));
    }
}

#[test]
fn test_help_lists_commands() {
    let env = Env::new();
    env.cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("start"))
        .stdout(predicate::str::contains("orgs"))
        .stdout(predicate::str::contains("export"));
}

#[test]
fn test_start_without_session_lands_on_login() {
    let env = Env::new();
    env.cmd()
        .arg("start")
        .assert()
        .success()
        .stdout(predicate::str::contains("/auth/login"));
}

#[test]
fn test_start_json_output() {
    let env = Env::new();
    env.cmd()
        .args(["start", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"kind\": \"login\""));
}

#[test]
fn test_start_reports_connectivity_failure() {
    let env = Env::new();
    env.login();

    env.cmd()
        .arg("start")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Network connectivity issue"))
        .stderr(predicate::str::contains("E102"));
}

#[test]
fn test_login_persists_until_logout() {
    let env = Env::new();
    env.login();
    assert!(env.data.path().join("session.json").exists());

    env.cmd()
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged out."));
    assert!(!env.data.path().join("session.json").exists());

    env.cmd()
        .arg("start")
        .assert()
        .success()
        .stdout(predicate::str::contains("/auth/login"));
}

#[test]
fn test_orgs_list_requires_login() {
    let env = Env::new();
    env.cmd()
        .args(["orgs", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not logged in"));
}

#[test]
fn test_orgs_sync_never_fails() {
    let env = Env::new();
    env.login();
    env.cmd()
        .args(["orgs", "sync"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Synced 0 organizations."));
}

#[test]
fn test_scratch_org_features_are_disabled() {
    let env = Env::new();
    env.cmd()
        .args(["orgs", "features", "org_scratchpad"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gitSync"))
        .stdout(predicate::str::contains("disabled (Courier API unreachable)"));
}

#[test]
fn test_unreachable_features_degrade() {
    let env = Env::new();
    env.login();
    env.cmd()
        .args(["orgs", "features", "org_team", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"enabled\": false"));
}

#[test]
fn test_untracked_excludes_scratch_pad() {
    let env = Env::new();
    env.cmd()
        .args(["projects", "untracked"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No untracked projects."));
}

#[test]
fn test_export_then_import() {
    let env = Env::new();
    let out = TempDir::new().unwrap();

    env.cmd()
        .args(["export"])
        .arg(out.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Export Complete"));
    assert!(out.path().join("projects.jsonl").exists());
    assert!(out.path().join("workspaces.jsonl").exists());
    assert!(out.path().join("_metadata.json").exists());

    let other = Env::new();
    other
        .cmd()
        .arg("import")
        .arg(out.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 records."));
}

#[test]
fn test_export_json_reports_counts() {
    let env = Env::new();
    let out = TempDir::new().unwrap();

    env.cmd()
        .args(["export", "--format", "json"])
        .arg(out.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_records\": 2"));
}

#[test]
fn test_export_unknown_project_fails() {
    let env = Env::new();
    let out = TempDir::new().unwrap();

    env.cmd()
        .args(["export", "--project", "proj_missing"])
        .arg(out.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Export Failed"));
}

#[test]
fn test_export_cancelled_on_empty_prompt() {
    let env = Env::new();
    env.cmd()
        .arg("export")
        .write_stdin("\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Export Complete").not());
}

#[test]
fn test_export_to_prompted_directory() {
    let env = Env::new();
    let out = TempDir::new().unwrap();
    env.cmd()
        .arg("export")
        .write_stdin(format!("{}\n", out.path().display()))
        .assert()
        .success()
        .stdout(predicate::str::contains("Export Complete"));
    assert!(out.path().join("projects.jsonl").exists());
}

#[test]
fn test_import_missing_directory_fails() {
    let env = Env::new();
    env.cmd()
        .args(["import", "/definitely/not/here"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Import directory not found"));
}

#[test]
fn test_config_set_and_get() {
    let env = Env::new();

    env.cmd()
        .args(["config", "set", "sync.promotion_concurrency", "8"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Set sync.promotion_concurrency = 8"));

    env.cmd()
        .args(["config", "get", "sync.promotion_concurrency"])
        .assert()
        .success()
        .stdout(predicate::str::contains("8"));

    env.cmd()
        .args(["config", "set", "sync.promotion_concurrency", "0"])
        .assert()
        .failure();
}

#[test]
fn test_config_path_uses_override() {
    let env = Env::new();
    env.cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}
