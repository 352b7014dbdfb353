//! Integration tests for the pmon binary.

use std::process::{Command, Output};

fn pmon(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pmon"))
        .arg("--no-config")
        .args(args)
        .output()
        .expect("Failed to run pmon")
}

#[test]
fn test_no_pids_prints_usage() {
    let output = pmon(&[]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage"));
    assert!(stdout.contains("--interval"));
}

#[test]
fn test_csv_sample_of_own_process() {
    let pid = std::process::id().to_string();
    let output = pmon(&["-f", "csv", "-l", "50ms", "-u", "B", &pid]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines[0],
        "time,pid,peak_size,current_size,peak_resident,current_resident"
    );
    assert_eq!(lines.len(), 2);

    let fields: Vec<&str> = lines[1].split(',').collect();
    assert_eq!(fields.len(), 6);
    assert_eq!(fields[1], pid);
    assert!(fields[2].parse::<u64>().unwrap() > 0);
}

#[test]
fn test_json_has_no_header() {
    let pid = std::process::id().to_string();
    let output = pmon(&["-f", "json", "-l", "50ms", &pid]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 1);

    let value: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(value["pid"].as_u64(), Some(std::process::id() as u64));
    assert!(value["current_resident"].is_string());
}

#[test]
fn test_nonexistent_pid_exits_cleanly() {
    let output = pmon(&["-f", "csv", "-l", "2s", "-i", "10ms", "999999999"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 1);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("999999999"));
}

#[test]
fn test_invalid_unit_fails() {
    let output = pmon(&["-u", "bogus", "1"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid unit bogus"));
}

#[test]
fn test_invalid_pid_fails() {
    let output = pmon(&["abc"]);
    assert!(!output.status.success());
}

#[test]
fn test_check_config() {
    let output = pmon(&["--check-config"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Configuration is valid"));

    let output = pmon(&["--check-config", "-i", "0s"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_cmd_is_monitored() {
    let output = pmon(&["-f", "csv", "-l", "300ms", "-i", "100ms", "--cmd", "sleep 5"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.lines().count() >= 2);
}
