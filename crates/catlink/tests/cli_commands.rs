#![cfg(all(unix, feature = "cli"))]

use std::path::PathBuf;
use std::process::{Command, Output};

fn missing_port(tag: &str) -> PathBuf {
    PathBuf::from(format!(
        "/tmp/catlink-{tag}-{}-missing-tty",
        std::process::id()
    ))
}

fn catlink(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_catlink"))
        .env_remove("CATLINK_PORT")
        .env_remove("CATLINK_BAUD")
        .env_remove("CATLINK_DIALECT")
        .args(["--log-level", "error"])
        .args(args)
        .output()
        .expect("catlink should run")
}

#[test]
fn version_prints_package_version() {
    let output = catlink(&["version"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim(),
        format!("catlink {}", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn extended_version_reports_framing_defaults() {
    let output = catlink(&["version", "--extended"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("markers: start=@S end=@E"));
    assert!(stdout.contains("default_dialect: generic"));
    assert!(stdout.contains("default_baud: 921600"));
}

#[test]
fn probe_missing_port_fails_health_check() {
    let port = missing_port("probe");
    let output = catlink(&[
        "--format",
        "json",
        "probe",
        "--port",
        port.to_str().expect("utf-8 path"),
    ]);

    assert_eq!(output.status.code(), Some(30));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"reachable\":false"));
}

#[test]
fn send_invalid_hex_is_usage_error() {
    let port = missing_port("send-hex");
    let output = catlink(&[
        "send",
        "--port",
        port.to_str().expect("utf-8 path"),
        "--hex",
        "not-hex",
    ]);

    assert_eq!(output.status.code(), Some(64));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--hex is not valid hex"));
}

#[test]
fn send_to_missing_port_is_transport_error() {
    let port = missing_port("send");
    let output = catlink(&[
        "send",
        "--port",
        port.to_str().expect("utf-8 path"),
        "--data",
        "@Sping@E",
    ]);

    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn listen_to_missing_port_is_transport_error() {
    let port = missing_port("listen");
    let output = catlink(&[
        "listen",
        "--port",
        port.to_str().expect("utf-8 path"),
        "--count",
        "1",
    ]);

    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn listen_rejects_bad_timeout_before_opening() {
    let port = missing_port("listen-timeout");
    let output = catlink(&[
        "listen",
        "--port",
        port.to_str().expect("utf-8 path"),
        "--timeout",
        "0s",
    ]);

    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn ports_json_is_an_array() {
    let output = catlink(&["--format", "json", "ports"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.trim_start().starts_with('['));
}
