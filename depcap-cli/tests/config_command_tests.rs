//! Integration tests for the `depcap` binary.
//!
//! Tests config validation and display, the services listing and the
//! analyze command against real TOML files, archives and graph exports.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;
use zip::write::SimpleFileOptions;

/// Run the depcap binary inside `dir` with a clean environment.
fn depcap(dir: &Path, args: &[&str]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_depcap"));
    command
        .current_dir(dir)
        .args(args)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    for (key, _) in std::env::vars() {
        if key.starts_with("DEPCAP_") {
            command.env_remove(key);
        }
    }
    command.output().expect("should run depcap binary")
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("valid UTF-8")
}

fn write_jar(dir: &Path, name: &str, entries: &[(&str, &str)]) -> PathBuf {
    let path = dir.join(name);
    let file = File::create(&path).expect("should create jar");
    let mut zip = zip::ZipWriter::new(file);
    for (entry, content) in entries {
        zip.start_file(*entry, SimpleFileOptions::default())
            .expect("should start entry");
        zip.write_all(content.as_bytes()).expect("should write entry");
    }
    zip.finish().expect("should finish jar");
    path
}

#[tokio::test]
async fn test_config_validate_valid_toml() {
    // Given: A valid config file
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("depcap.toml");

    let valid_config = r#"
[general]
log_level = "info"
log_format = "json"

[cache]
max_size = 1000

[analyzer]
max_concurrent_scans = 4
scanners = ["service_loader", "class_file"]
"#;

    fs::write(&config_path, valid_config).expect("should write config");

    // When: Loading the config
    let result = depcap_core::config::DepcapConfig::load(&config_path).await;

    // Then: Should succeed
    let config = result.expect("valid config should load successfully");
    assert_eq!(config.cache.bound(), Some(1000));
    assert_eq!(config.analyzer.scanners.len(), 2);
}

#[tokio::test]
async fn test_config_validate_malformed_toml() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("bad.toml");

    fs::write(&config_path, "[general\nlog_level = \"info\"\n").expect("should write bad config");

    let result = depcap_core::config::DepcapConfig::load(&config_path).await;
    assert!(result.is_err(), "malformed TOML should fail to load");
}

#[test]
fn test_cli_config_validate_reports_valid() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    fs::write(temp_dir.path().join("depcap.toml"), "[cache]\nmax_size = 10\n")
        .expect("should write config");

    let output = depcap(temp_dir.path(), &["config", "validate"]);

    assert!(output.status.success(), "valid config should exit 0");
    let out = stdout(&output);
    assert!(out.contains("VALID") && !out.contains("INVALID"));
}

#[test]
fn test_cli_config_validate_invalid_exits_2() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("custom.toml");
    fs::write(&config_path, "[general]\nlog_level = \"loud\"\n").expect("should write config");

    let output = depcap(
        temp_dir.path(),
        &["--config", config_path.to_str().expect("utf-8 path"), "config", "validate"],
    );

    assert_eq!(output.status.code(), Some(2), "invalid config should exit 2");
    let out = stdout(&output);
    assert!(out.contains("INVALID"));
    assert!(out.contains("  - config error"), "errors are listed: {out}");
    assert!(out.contains("general.log_level"));
}

#[test]
fn test_cli_config_missing_explicit_file_exits_2() {
    let temp_dir = TempDir::new().expect("should create temp dir");

    let output = depcap(
        temp_dir.path(),
        &["--config", "does-not-exist.toml", "services", "a.jar"],
    );

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("does-not-exist.toml"));
}

#[test]
fn test_cli_config_show_section_json() {
    let temp_dir = TempDir::new().expect("should create temp dir");

    let output = depcap(
        temp_dir.path(),
        &["config", "show", "--section", "cache", "--output", "json"],
    );

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("should be JSON");
    assert_eq!(json["section"], "cache");
    assert_eq!(json["source"], "(defaults)");
}

#[test]
fn test_cli_config_show_defaults_text() {
    let temp_dir = TempDir::new().expect("should create temp dir");

    let output = depcap(temp_dir.path(), &["config", "show"]);

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("[analyzer]"));
    assert!(out.contains("max_concurrent_scans = 8"));
}

#[test]
fn test_cli_services_lists_descriptors() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let jar = write_jar(
        temp_dir.path(),
        "coroutines-android.jar",
        &[
            ("META-INF/MANIFEST.MF", "Manifest-Version: 1.0\n"),
            (
                "META-INF/services/kotlinx.coroutines.internal.MainDispatcherFactory",
                "kotlinx.coroutines.android.AndroidDispatcherFactory\n",
            ),
            (
                "META-INF/services/javax.annotation.processing.Processor",
                "com.example.Processor\n",
            ),
        ],
    );

    let output = depcap(
        temp_dir.path(),
        &[
            "services",
            jar.to_str().expect("utf-8 path"),
            "missing.jar",
            "--output",
            "json",
        ],
    );

    assert!(output.status.success(), "unreadable archives do not fail the command");
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("should be JSON");
    let archives = json["archives"].as_array().expect("archives array");
    assert_eq!(archives.len(), 2);

    let services = archives[0]["services"].as_array().expect("services array");
    assert_eq!(services.len(), 1, "processor registration is excluded");
    assert_eq!(
        services[0]["provider_file"],
        "kotlinx.coroutines.internal.MainDispatcherFactory"
    );
    assert!(archives[1]["error"].is_string());
}

#[test]
fn test_cli_analyze_graph() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let jar = write_jar(
        temp_dir.path(),
        "okhttp.jar",
        &[
            (
                "META-INF/services/okhttp3.internal.platform.Platform",
                "okhttp3.internal.platform.AndroidPlatform\n",
            ),
            ("lib/arm64-v8a/libokhttp.so", "\u{7f}ELF"),
        ],
    );

    let graph = serde_json::json!({
        "artifacts": [
            {
                "component": {"kind": "module", "group": "com.squareup.okhttp3",
                              "name": "okhttp", "version": "4.12.0"},
                "file": jar
            }
        ],
        "declared": [
            {"kind": "module", "group": "com.squareup.okhttp3", "name": "okhttp", "version": "4.12.0"}
        ]
    });
    let graph_path = temp_dir.path().join("graph.json");
    fs::write(&graph_path, graph.to_string()).expect("should write graph");

    let output = depcap(
        temp_dir.path(),
        &["analyze", "graph.json", "--output", "json"],
    );

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("should be JSON");
    assert_eq!(json["summary"]["dependencies"], 1);
    let record = &json["records"][0];
    assert_eq!(record["declared"], true);
    let kinds: Vec<&str> = record["capabilities"]
        .as_array()
        .expect("capabilities array")
        .iter()
        .filter_map(|c| c["type"].as_str())
        .collect();
    assert!(kinds.contains(&"service_loader"));
    assert!(kinds.contains(&"native"));
}

#[test]
fn test_cli_analyze_unsupported_reference_exits_3() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    fs::write(
        temp_dir.path().join("graph.json"),
        r#"{"artifacts": [{"component": {"kind": "library_binary", "display_name": "x"}, "file": "x.jar"}]}"#,
    )
    .expect("should write graph");

    let output = depcap(temp_dir.path(), &["analyze", "graph.json"]);

    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn test_cli_analyze_invalid_graph_exits_1() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    fs::write(temp_dir.path().join("graph.json"), "not json").expect("should write graph");

    let output = depcap(temp_dir.path(), &["analyze", "graph.json"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid graph export"));
}
