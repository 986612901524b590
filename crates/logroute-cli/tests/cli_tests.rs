//! Integration tests for the logroute binary
//!
//! Every command runs with provider credentials removed from the
//! environment and a config path inside a temp directory, so nothing
//! reaches the network.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const CREDENTIAL_VARS: &[&str] = &[
    "OPENAI_API_KEY",
    "ANTHROPIC_API_KEY",
    "GOOGLE_API_KEY",
    "ENABLE_MODEL_FALLBACK",
    "LOG_AI_PERFORMANCE",
];

fn logroute_cmd(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("logroute").unwrap();
    for var in CREDENTIAL_VARS {
        cmd.env_remove(var);
    }
    cmd.env("LOGROUTE_CONFIG", config_dir.path().join("config.yml"));
    cmd
}

#[test]
fn test_stats_json_without_providers() {
    let dir = TempDir::new().unwrap();

    let output = logroute_cmd(&dir)
        .args(["stats", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["available_providers"], serde_json::json!([]));
    assert_eq!(report["total_requests"], 0);
    assert_eq!(
        report["routing_config"]["categories"]["simple"],
        serde_json::json!(["gemini", "openai", "claude"])
    );
}

#[test]
fn test_stats_cli_output() {
    let dir = TempDir::new().unwrap();

    logroute_cmd(&dir)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Available:       none"))
        .stdout(predicate::str::contains("Routing:"));
}

#[test]
fn test_route_without_providers_fails_with_structured_error() {
    let dir = TempDir::new().unwrap();

    logroute_cmd(&dir)
        .args(["route", "show", "errors", "from", "today"])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("No AI provider available"))
        .stderr(predicate::str::contains("Request: show errors from today"));
}

#[test]
fn test_route_failure_json() {
    let dir = TempDir::new().unwrap();

    let output = logroute_cmd(&dir)
        .args(["route", "--format", "json", "list", "services"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));

    let failure: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(failure["request"], "list services");
    assert_eq!(failure["kind"], "no_provider_available");
}

#[test]
fn test_health_reports_not_configured() {
    let dir = TempDir::new().unwrap();

    let output = logroute_cmd(&dir)
        .args(["health", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let health: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(health.len(), 3);
    assert!(health.iter().all(|h| h["status"] == "not_configured"));
}

#[test]
fn test_compare_unconfigured_provider() {
    let dir = TempDir::new().unwrap();

    let output = logroute_cmd(&dir)
        .args(["compare", "--providers", "openai,claude", "--format", "json", "hello"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let results: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["provider"], "openai");
    assert_eq!(results[0]["success"], false);
}

#[test]
fn test_unknown_provider_is_rejected() {
    let dir = TempDir::new().unwrap();

    logroute_cmd(&dir)
        .args(["route", "--provider", "mistral", "hello"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("mistral"));
}

#[test]
fn test_test_provider_without_key() {
    let dir = TempDir::new().unwrap();

    logroute_cmd(&dir)
        .args(["test-provider", "gemini"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gemini"))
        .stdout(predicate::str::contains("not configured"));
}

#[test]
fn test_config_path_and_init() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.yml");

    logroute_cmd(&dir)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.yml"));

    logroute_cmd(&dir)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote default config"));
    assert!(config_path.exists());

    logroute_cmd(&dir)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_config_show_masks_keys() {
    let dir = TempDir::new().unwrap();

    let output = logroute_cmd(&dir)
        .env("OPENAI_API_KEY", "sk-test-abcd1234")
        .args(["config", "show", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let config: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(config["providers"]["openai"]["api_key"], "****1234");
    assert!(!String::from_utf8_lossy(&output.stdout).contains("sk-test"));
}
