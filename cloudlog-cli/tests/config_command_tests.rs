//! Integration tests for `cloudlog` configuration handling and command flow.
//!
//! Config loading is tested against real TOML files; the command flow tests
//! run the built binary against a temporary data directory.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

use cloudlog_core::config::CloudlogConfig;

fn cloudlog(config_path: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cloudlog"))
        .arg("--config")
        .arg(config_path)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("should run cloudlog binary")
}

fn write_config(dir: &TempDir) -> std::path::PathBuf {
    let config_path = dir.path().join("cloudlog.toml");
    let data_dir = dir.path().join("data");
    let export_dir = dir.path().join("exports");
    let config = format!(
        r#"
[storage]
data_dir = "{}"

[collector]
export_dir = "{}"
"#,
        data_dir.display().to_string().replace('\\', "/"),
        export_dir.display().to_string().replace('\\', "/"),
    );
    fs::write(&config_path, config).expect("should write config");
    config_path
}

#[tokio::test]
async fn test_config_validate_valid_toml() {
    // Given: A valid config file
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("cloudlog.toml");

    let valid_config = r#"
[general]
log_level = "info"
log_format = "json"

[analysis]
error_rate_threshold = 0.25
bucket_width = "15m"
"#;

    fs::write(&config_path, valid_config).expect("should write config");

    // When: Loading the config
    let result = CloudlogConfig::load(&config_path).await;

    // Then: Should succeed with the file values
    let config = result.expect("valid config should load successfully");
    assert_eq!(config.analysis.bucket_width, "15m");
    assert!((config.analysis.error_rate_threshold - 0.25).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_config_validate_malformed_toml() {
    // Given: A malformed TOML file
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("bad.toml");

    fs::write(&config_path, "[analysis\ntop_errors = 3\n").expect("should write bad config");

    // When: Loading the config
    let result = CloudlogConfig::load(&config_path).await;

    // Then: Should fail
    assert!(result.is_err(), "malformed TOML should fail to load");
}

#[tokio::test]
async fn test_config_validate_missing_file() {
    // Given: A nonexistent file path
    let config_path = std::path::PathBuf::from("/nonexistent/cloudlog.toml");

    // When: Loading the config
    let result = CloudlogConfig::load(&config_path).await;

    // Then: Should fail
    assert!(result.is_err(), "missing file should fail to load");
}

#[tokio::test]
async fn test_config_boundary_values() {
    // Given: A threshold exactly at the upper bound and one past it
    let temp_dir = TempDir::new().expect("should create temp dir");
    let at_bound = temp_dir.path().join("at_bound.toml");
    let past_bound = temp_dir.path().join("past_bound.toml");
    fs::write(&at_bound, "[analysis]\nerror_rate_threshold = 1.0\n").expect("write");
    fs::write(&past_bound, "[analysis]\nerror_rate_threshold = 1.5\n").expect("write");

    // Then: 1.0 is accepted, 1.5 is rejected
    assert!(CloudlogConfig::load(&at_bound).await.is_ok());
    assert!(CloudlogConfig::load(&past_bound).await.is_err());
}

#[test]
fn test_cli_config_validate_reports_invalid_bucket_width() {
    // Given: A config with a bucket width that does not divide an hour
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("cloudlog.toml");
    fs::write(&config_path, "[analysis]\nbucket_width = \"7m\"\n").expect("write");

    // When: Running `config validate`
    let output = cloudlog(&config_path, &["config", "validate", "--output", "json"]);

    // Then: Exit code 2 with a JSON report naming the field
    assert_eq!(output.status.code(), Some(2));
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(report["valid"], false);
    assert!(
        report["errors"][0]
            .as_str()
            .is_some_and(|e| e.contains("bucket_width"))
    );
}

#[test]
fn test_cli_explicit_missing_config_fails() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let output = cloudlog(&temp_dir.path().join("missing.toml"), &["stats"]);
    assert_eq!(output.status.code(), Some(2), "missing config is a config error");
}

#[test]
fn test_cli_collect_then_stats_and_analyze() {
    // Given: An empty data directory and no provider export
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = write_config(&temp_dir);

    // When: Collecting with sample fallback
    let collect = cloudlog(
        &config_path,
        &["collect", "aws", "--hours", "1", "--output", "json"],
    );
    assert!(collect.status.success(), "collect should fall back to samples");
    let collect: serde_json::Value =
        serde_json::from_slice(&collect.stdout).expect("collect JSON");
    assert_eq!(collect["indexed"], 30);
    assert_eq!(collect["fell_back"], true);

    // Then: Stats see the collected records
    let stats = cloudlog(&config_path, &["stats", "--output", "json"]);
    assert!(stats.status.success());
    let stats: serde_json::Value = serde_json::from_slice(&stats.stdout).expect("stats JSON");
    assert_eq!(stats["total"], 30);
    assert_eq!(stats["breakdown"]["ERROR"], 10);

    // And: Anomaly detection flags the 33.3% error rate
    let anomalies = cloudlog(
        &config_path,
        &["analyze", "--type", "anomalies", "--output", "json"],
    );
    assert!(anomalies.status.success());
    let anomalies: serde_json::Value =
        serde_json::from_slice(&anomalies.stdout).expect("analyze JSON");
    assert_eq!(anomalies["type"], "anomalies");
    assert_eq!(anomalies["findings"][0]["type"], "high_error_rate");

    // And: Text query output uses `[timestamp] LEVEL: message`
    let query = cloudlog(&config_path, &["query", "--text", "timeout", "--limit", "2"]);
    assert!(query.status.success());
    let text = String::from_utf8(query.stdout).expect("utf-8");
    assert!(text.contains("ERROR: ERROR: Connection timeout to external service"));
}

#[test]
fn test_cli_collect_without_fallback_exit_code() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = write_config(&temp_dir);

    let output = cloudlog(&config_path, &["collect", "azure", "--no-fallback"]);
    assert_eq!(output.status.code(), Some(4));
    let stderr = String::from_utf8(output.stderr).expect("utf-8");
    assert!(stderr.contains("azure"));
}

#[test]
fn test_cli_invalid_time_range_exit_code() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = write_config(&temp_dir);

    let output = cloudlog(&config_path, &["stats", "--last", "2w"]);
    assert_eq!(output.status.code(), Some(1));
}
