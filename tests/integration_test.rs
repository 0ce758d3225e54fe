mod utils;

use assert_cmd::Command;
use predicates::prelude::*;
use utils::{bind_listener, free_port};

#[test]
fn test_single_port_available() {
    let port = free_port();
    let mut cmd = Command::cargo_bin("portcheck").unwrap();
    cmd.args(&[port.to_string()])
        .assert()
        .success()
        .stdout(format!("○ Port {port} is available\n"));
}

#[test]
fn test_single_port_in_use() {
    let (_listener, port) = bind_listener();
    let mut cmd = Command::cargo_bin("portcheck").unwrap();
    cmd.args(&[port.to_string()])
        .assert()
        .success()
        .stdout(format!("● Port {port} is in use\n"));
}

/// The test process itself owns the listener, so it must be reported as the owner.
#[cfg(target_os = "linux")]
#[test]
fn test_pid_flag_reports_owner() {
    let (_listener, port) = bind_listener();
    let pid = std::process::id();
    let port_arg = port.to_string();
    let mut cmd = Command::cargo_bin("portcheck").unwrap();
    cmd.args(["--pid", port_arg.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(format!(
            "● Port {port} is in use (PID: {pid}, Process: "
        )));
}

#[test]
fn test_range_scan_lists_in_use_ports_and_summary() {
    let (_listener, port) = bind_listener();
    let start = port.saturating_sub(2).max(1);
    let total = port - start + 1;

    let mut cmd = Command::cargo_bin("portcheck").unwrap();
    cmd.args(&[format!("{start}-{port}"), "-c".to_string(), "2".to_string()])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(format!(
            "Scanning ports {start}-{port}...\n\n"
        )))
        .stdout(predicate::str::contains(format!("● Port {port} is in use\n")))
        .stdout(
            predicate::str::is_match(format!(
                r"\n{total} ports scanned in [\d.]+[mµn]?s \| \d+ in use, \d+ available\n$"
            ))
            .unwrap(),
        );
}

#[test]
fn test_out_of_range_port_is_rejected() {
    let mut cmd = Command::cargo_bin("portcheck").unwrap();
    cmd.args(&["70000"])
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn test_reversed_range_is_rejected() {
    let mut cmd = Command::cargo_bin("portcheck").unwrap();
    cmd.args(&["100-50"])
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("start 100 is greater than end 50"));
}

#[test]
fn test_oversized_concurrency_is_rejected() {
    let mut cmd = Command::cargo_bin("portcheck").unwrap();
    cmd.args(&["5000-5001", "-c", "18446744073709551615"])
        .assert()
        .code(2)
        .stdout("")
        .stderr(predicate::str::contains("concurrency must be between 1 and 65535"));
}

#[test]
fn test_malformed_range_is_rejected() {
    let mut cmd = Command::cargo_bin("portcheck").unwrap();
    cmd.args(&["80-90-100"]).assert().failure().stdout("");
}

#[test]
fn test_missing_argument_prints_usage() {
    let mut cmd = Command::cargo_bin("portcheck").unwrap();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}
