//! Test environment for running the iacdeploy binary in isolation.
//!
//! Every run uses the local provider with a state directory inside the
//! temporary project, and points HOME / XDG_CONFIG_HOME at a temporary
//! home so no user settings leak in.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

/// Environment variables the binary reads; cleared for every run
const ISOLATED_VARS: &[&str] = &[
    "IACDEPLOY_SETTINGS",
    "IACDEPLOY_TOKEN_PREFIX",
    "IACDEPLOY_TOKEN_SUFFIX",
    "IACDEPLOY_ENABLE_DEFAULT_TELEMETRY",
    "IACDEPLOY_PROVIDER",
    "IACDEPLOY_STATE_DIR",
    "IACDEPLOY_RETRY_LIMIT",
    "GITHUB_ACTIONS",
    "RUST_LOG",
];

/// Result of running an iacdeploy command
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    /// Combine stdout and stderr
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }

    /// Parse stdout as NDJSON, skipping blank lines
    pub fn events(&self) -> Vec<Value> {
        self.stdout
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| {
                serde_json::from_str(l).unwrap_or_else(|e| panic!("not JSON: {l}: {e}"))
            })
            .collect()
    }

    /// `name=value` output lines printed after a deployment
    pub fn output_line(&self, name: &str) -> Option<String> {
        let prefix = format!("{name}=");
        self.stdout
            .lines()
            .find_map(|l| l.strip_prefix(&prefix).map(str::to_string))
    }
}

/// Isolated test environment with temp directories
pub struct TestEnv {
    pub project_root: TempDir,
    pub home_dir: TempDir,
    bin: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            project_root: tempfile::tempdir().expect("Failed to create project dir"),
            home_dir: tempfile::tempdir().expect("Failed to create home dir"),
            bin: PathBuf::from(env!("CARGO_BIN_EXE_iacdeploy")),
        }
    }

    /// Get path relative to project root
    pub fn project_path(&self, relative: &str) -> PathBuf {
        self.project_root.path().join(relative)
    }

    /// State directory handed to the local provider
    pub fn state_dir(&self) -> PathBuf {
        self.project_path("state")
    }

    /// Write a file to the project directory
    pub fn write_project_file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.project_path(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create directories");
        }
        std::fs::write(&path, content).expect("Failed to write file");
        path
    }

    pub fn read_project_file(&self, relative: &str) -> String {
        std::fs::read_to_string(self.project_path(relative))
            .unwrap_or_else(|e| panic!("Failed to read {relative}: {e}"))
    }

    /// Persisted local provider state, or `Null` before the first write
    pub fn provider_state(&self) -> Value {
        match std::fs::read_to_string(self.state_dir().join("state.json")) {
            Ok(content) => serde_json::from_str(&content).expect("corrupt state.json"),
            Err(_) => Value::Null,
        }
    }

    /// Ids of resources the local provider currently holds
    pub fn resources(&self) -> Vec<String> {
        self.provider_state()["resources"]
            .as_object()
            .map(|m| m.values().filter_map(|v| v.as_str().map(str::to_string)).collect())
            .unwrap_or_default()
    }

    /// Run iacdeploy against the local provider from the project root
    pub fn run(&self, args: &[&str]) -> TestResult {
        self.run_with_env(args, &[])
    }

    pub fn run_with_env(&self, args: &[&str], env_vars: &[(&str, &str)]) -> TestResult {
        let state_dir = self.state_dir();
        let mut cmd = Command::new(&self.bin);
        cmd.current_dir(self.project_root.path())
            .with_test_home(self.home_dir.path())
            .env("NO_COLOR", "1")
            .args(["--provider", "local", "--state-dir"])
            .arg(&state_dir)
            .args(args);
        for key in ISOLATED_VARS {
            cmd.env_remove(key);
        }
        for (key, value) in env_vars {
            cmd.env(key, value);
        }

        let output = cmd.output().expect("Failed to execute iacdeploy");
        to_result(output)
    }
}

fn to_result(output: Output) -> TestResult {
    TestResult {
        success: output.status.success(),
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }
}

/// Point every home-derived directory at a temporary home
pub trait TestHomeExt {
    fn with_test_home(&mut self, home: &Path) -> &mut Self;
}

impl TestHomeExt for Command {
    fn with_test_home(&mut self, home: &Path) -> &mut Self {
        self.env("HOME", home)
            .env("USERPROFILE", home)
            .env("XDG_CONFIG_HOME", home.join(".config"))
    }
}
