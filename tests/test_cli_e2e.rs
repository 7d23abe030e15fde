mod common;

use common::{PipecfgProcess, stderr, stdout};

// ============================================================================
// version / completions
// ============================================================================

#[test]
fn version_human() {
    let output = PipecfgProcess::spawn_command(&["version"]);
    assert!(
        output.status.success(),
        "version should exit 0: {}",
        stderr(&output)
    );

    let stdout = stdout(&output);
    assert!(
        stdout.starts_with("pipecfg "),
        "version output should start with the binary name: {stdout}"
    );
    assert!(
        stdout.contains('.'),
        "version output should contain a version number: {stdout}"
    );
}

#[test]
fn version_json() {
    let output = PipecfgProcess::spawn_command(&["version", "--format", "json"]);
    assert!(output.status.success());

    let parsed: serde_json::Value =
        serde_json::from_str(&stdout(&output)).expect("version JSON should be valid");
    assert_eq!(parsed["name"], "pipecfg");
    assert!(parsed.get("version").is_some());
}

#[test]
fn completions_bash() {
    let output = PipecfgProcess::spawn_command(&["completions", "bash"]);
    assert!(
        output.status.success(),
        "completions bash should exit 0: {}",
        stderr(&output)
    );

    let stdout = stdout(&output);
    assert!(
        stdout.contains("pipecfg"),
        "bash completions should reference pipecfg"
    );
}

#[test]
fn completions_other_shells() {
    for shell in ["zsh", "fish", "powershell", "elvish"] {
        let output = PipecfgProcess::spawn_command(&["completions", shell]);
        assert!(output.status.success(), "completions {shell} should exit 0");
        assert!(!output.stdout.is_empty(), "completions {shell} produced no output");
    }
}

// ============================================================================
// usage errors
// ============================================================================

#[test]
fn missing_subcommand_is_usage_error() {
    let output = PipecfgProcess::spawn_command(&[]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn validate_without_files_is_usage_error() {
    let output = PipecfgProcess::spawn_command(&["validate"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn help_exits_zero() {
    let output = PipecfgProcess::spawn_command(&["--help"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("validate"));
}

// ============================================================================
// show
// ============================================================================

#[test]
fn show_round_trips_through_validate() {
    let config = PipecfgProcess::reference_config();
    let output = PipecfgProcess::spawn_command(&["show", config.to_str().unwrap()]);
    assert!(output.status.success(), "show failed: {}", stderr(&output));

    let normalized = stdout(&output);
    assert!(normalized.contains("test_size: 0.2"));
    assert!(normalized.contains("random_state: 42"));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("normalized.yaml");
    std::fs::write(&path, &normalized).unwrap();

    let output = PipecfgProcess::spawn_command(&["validate", "--strict", path.to_str().unwrap()]);
    assert!(
        output.status.success(),
        "normalized document should validate: {}",
        stdout(&output)
    );
}

#[test]
fn show_section_json() {
    let config = PipecfgProcess::reference_config();
    let output = PipecfgProcess::spawn_command(&[
        "show",
        config.to_str().unwrap(),
        "--section",
        "model",
        "--format",
        "json",
    ]);
    assert!(output.status.success(), "show failed: {}", stderr(&output));

    let parsed: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(parsed["model"]["algorithm"], "random_forest");
    assert_eq!(parsed["model"]["hyperparameters"]["n_estimators"], 30);
    assert!(parsed.get("dataset").is_none());
}

#[test]
fn show_uses_config_env() {
    let config = PipecfgProcess::fixture_path("regression.yaml");
    let output = PipecfgProcess::spawn_with_env(
        &["show", "--section", "evaluation"],
        &[("PIPECFG_CONFIG", config.to_str().unwrap())],
    );
    assert!(output.status.success(), "show failed: {}", stderr(&output));
    assert!(stdout(&output).contains("rmse"));
}

#[test]
fn show_invalid_config_fails() {
    let config = PipecfgProcess::fixture_path("invalid_scaling.yaml");
    let output = PipecfgProcess::spawn_command(&["show", config.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("zscore"));
}

#[test]
fn show_missing_file_fails() {
    let output = PipecfgProcess::spawn_command(&["show", "/nonexistent/pipecfg/config.yaml"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("file not found"));
}

// ============================================================================
// plan
// ============================================================================

#[test]
fn plan_human() {
    let config = PipecfgProcess::reference_config();
    let output = PipecfgProcess::spawn_command(&["plan", config.to_str().unwrap()]);
    assert!(output.status.success(), "plan failed: {}", stderr(&output));

    let stdout = stdout(&output);
    assert!(stdout.contains("input:   data/raw/input.csv"));
    assert!(stdout.contains("numeric      price"));
    assert!(stdout.contains("metrics: accuracy, precision, recall, f1"));
}

#[test]
fn plan_json() {
    let config = PipecfgProcess::fixture_path("regression.yaml");
    let output =
        PipecfgProcess::spawn_command(&["plan", config.to_str().unwrap(), "--format", "json"]);
    assert!(output.status.success(), "plan failed: {}", stderr(&output));

    let parsed: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(parsed["ingestion"]["data_path"], "data/raw/housing.csv");
    assert_eq!(parsed["ingestion"]["random_state"], 7);
    assert_eq!(parsed["stages"].as_array().map(Vec::len), Some(3));
    assert_eq!(parsed["evaluation"]["task"], "regression");
}

#[test]
fn plan_header_with_all_columns() {
    let config = PipecfgProcess::reference_config();
    let output = PipecfgProcess::spawn_command(&[
        "plan",
        config.to_str().unwrap(),
        "--header",
        "id,review_text,price,category",
    ]);
    assert!(output.status.success(), "plan failed: {}", stderr(&output));
}

#[test]
fn plan_header_missing_columns() {
    let config = PipecfgProcess::reference_config();
    let output = PipecfgProcess::spawn_command(&[
        "plan",
        config.to_str().unwrap(),
        "--header",
        "id,review_text",
    ]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = stderr(&output);
    assert!(
        stderr.contains("price, category"),
        "error should list missing columns: {stderr}"
    );
}

#[test]
fn plan_header_with_quoted_names() {
    let config = PipecfgProcess::reference_config();
    let output = PipecfgProcess::spawn_command(&[
        "plan",
        config.to_str().unwrap(),
        "--header",
        "\"price, usd\",\"review_text\",price,category",
    ]);
    assert!(output.status.success(), "plan failed: {}", stderr(&output));
}
