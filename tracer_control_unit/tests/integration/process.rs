//! Integration test: the control unit binary as a process.
//!
//! Validates: SIGTERM ends a running loop with the stop frame and a clean
//! exit, and a sensor setup failure aborts before the loop starts.

use std::fs;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use tempfile::TempDir;

const BIN: &str = env!("CARGO_BIN_EXE_tracer_control_unit");

fn write_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("tracer.toml");
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn sigterm_sends_stop_frame_and_exits_cleanly() {
    let dir = TempDir::new().unwrap();
    let config = write_config(
        dir.path(),
        r#"
[control]
cycle_time_us = 1000

[simulation]
script = ["0110", "0010"]
repeat = true
"#,
    );

    let mut child = Command::new(BIN)
        .arg("--simulate")
        .arg("--config")
        .arg(&config)
        .env("RUST_LOG", "info")
        .env("NO_COLOR", "1")
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();

    let mut stdout = BufReader::new(child.stdout.take().unwrap());
    let mut log = String::new();
    loop {
        let mut line = String::new();
        if stdout.read_line(&mut line).unwrap() == 0 {
            break;
        }
        log.push_str(&line);
        if line.contains("Control loop started") {
            break;
        }
    }
    assert!(log.contains("Control loop started"), "loop never started:\n{log}");

    let pid = Pid::from_raw(i32::try_from(child.id()).unwrap());
    kill(pid, Signal::SIGTERM).unwrap();

    stdout.read_to_string(&mut log).unwrap();
    let status = child.wait().unwrap();

    assert!(status.success(), "exit status {status:?}\n{log}");
    assert!(log.contains("Received shutdown signal"), "{log}");
    assert!(log.contains("Stop frame sent"), "{log}");
    assert!(log.contains("Cancelled"), "{log}");
}

#[test]
fn missing_sensor_lines_abort_before_loop() {
    let dir = TempDir::new().unwrap();
    let gpio = TempDir::new().unwrap();
    let config = write_config(
        dir.path(),
        &format!(
            "[bus]\ndevice = \"/nonexistent/i2c-9\"\n\n[sensors]\ngpio_root = \"{}\"\n",
            gpio.path().display()
        ),
    );

    let output = Command::new(BIN)
        .arg("--driver")
        .arg("linux")
        .arg("--config")
        .arg(&config)
        .env("RUST_LOG", "info")
        .env("NO_COLOR", "1")
        .output()
        .unwrap();
    let log = String::from_utf8_lossy(&output.stdout);

    assert_eq!(output.status.code(), Some(1), "{log}");
    assert!(log.contains("FATAL"), "{log}");
    assert!(log.contains("Initialization failed"), "{log}");
    assert!(!log.contains("Control loop started"), "{log}");
}
