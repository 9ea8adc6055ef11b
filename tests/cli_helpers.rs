#![allow(dead_code)]

use anyhow::{bail, Result};
use assert_cmd::cargo;
use rust_decimal::Decimal;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::str::FromStr;
use tempfile::TempDir;

pub fn config_root_for_home(home: &TempDir) -> PathBuf {
    home.path().join(".config")
}

/// `ctc` with an isolated HOME so no user config is picked up
pub fn base_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("ctc"));
    cmd.env("HOME", home.path());
    cmd.env("XDG_CONFIG_HOME", config_root_for_home(home));
    cmd.env_remove("CTC_CONFIG");
    cmd.env_remove("RUST_LOG");
    cmd.current_dir(home.path());
    cmd.arg("--no-color");
    cmd
}

pub fn run_cmd(home: &TempDir, args: &[&str]) -> Result<Output> {
    let mut cmd = base_cmd(home);
    cmd.args(args);
    let output = cmd.output()?;
    if !output.status.success() {
        bail!(
            "command failed: {:?}\nstdout: {}\nstderr: {}",
            args,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(output)
}

pub fn run_cmd_json(home: &TempDir, args: &[&str]) -> Result<Value> {
    let output = run_cmd(home, args)?;
    let stdout = String::from_utf8(output.stdout)?;
    Ok(serde_json::from_str(&stdout)?)
}

pub fn write_file(home: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = home.path().join(name);
    std::fs::write(&path, contents).expect("failed to write test file");
    path
}

pub fn path_str(path: &Path) -> &str {
    path.to_str().expect("temp path is not UTF-8")
}

/// Read a decimal serialized as a JSON string
pub fn json_decimal(value: &Value, pointer: &str) -> Decimal {
    let text = value
        .pointer(pointer)
        .and_then(Value::as_str)
        .unwrap_or_else(|| panic!("missing decimal at {} in {}", pointer, value));
    Decimal::from_str(text).unwrap_or_else(|e| panic!("bad decimal {:?}: {}", text, e))
}
