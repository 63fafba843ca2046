use std::fs;
use std::process::Command;

use tempfile::TempDir;

fn sdfmarch() -> Command {
    Command::new(env!("CARGO_BIN_EXE_sdfmarch"))
}

#[test]
fn help_exits_successfully() {
    let output = sdfmarch().arg("--help").output().expect("failed to run sdfmarch --help");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--size"));
    assert!(stdout.contains("--exit-after"));
}

#[test]
fn version_exits_successfully() {
    let status = sdfmarch()
        .arg("--version")
        .status()
        .expect("failed to run sdfmarch --version");
    assert!(status.success());
}

#[test]
fn malformed_size_fails_before_any_rendering() {
    let output = sdfmarch()
        .args(["--size", "not-a-size"])
        .output()
        .expect("failed to run sdfmarch with bad size");
    assert!(!output.status.success());
}

#[test]
fn malformed_duration_fails_argument_parsing() {
    let output = sdfmarch()
        .args(["--exit-after", "soon"])
        .output()
        .expect("failed to run sdfmarch with bad duration");
    assert!(!output.status.success());
}

#[test]
fn missing_explicit_config_file_is_an_error() {
    let root = TempDir::new().unwrap();
    let output = sdfmarch()
        .args(["--config"])
        .arg(root.path().join("does-not-exist.toml"))
        .output()
        .expect("failed to run sdfmarch with missing config");
    assert!(!output.status.success());
}

#[test]
fn invalid_config_file_is_an_error() {
    let root = TempDir::new().unwrap();
    let config_path = root.path().join("sdfmarch.toml");
    fs::write(&config_path, "[window]\nwidth = 0\n").unwrap();

    let output = sdfmarch()
        .arg("--config")
        .arg(&config_path)
        .output()
        .expect("failed to run sdfmarch with invalid config");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to load settings"));
}
