//! Integration tests for the weathercard CLI

use std::process::Command;

fn weathercard() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_weathercard"));
    cmd.env_remove("WEATHERCARD_WEATHER__API_KEY")
        .env_remove("RUST_LOG")
        .args(["--config", "does-not-exist.toml"]);
    cmd
}

#[test]
fn test_cli_help() {
    let output = weathercard()
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("weathercard"));
    assert!(stdout.contains("Weather suitability cards"));
    assert!(stdout.contains("serve"));
    assert!(stdout.contains("check"));
}

#[test]
fn test_activities_command() {
    let output = weathercard()
        .arg("activities")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for name in ["Running", "Beach", "Picnic"] {
        assert!(stdout.contains(name), "missing {name} in {stdout}");
    }
}

#[test]
fn test_check_without_api_key_fails() {
    let output = weathercard()
        .args(["check", "--city", "Lisbon", "--activity", "running"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Configuration error"), "got: {stderr}");
}

#[test]
fn test_check_requires_city() {
    let output = weathercard()
        .args(["check", "--activity", "running"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
}
