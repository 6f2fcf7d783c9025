//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Test project context
///
/// A temporary recipe root plus an isolated config directory, so tests never
/// pick up the user's configuration.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
    /// Config directory handed to the binary
    pub config_dir: TempDir,
}

impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
            config_dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Read a file from the test project
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("Failed to read file")
    }

    /// Create a buildable recipe directory named after the package
    pub fn add_recipe(&self, name: &str, version: &str, deps: &[&str]) {
        self.create_file(&format!("{name}/meta.yaml"), &recipe_meta(name, version, deps));
        self.create_file(&format!("{name}/build.sh"), "#!/bin/sh\nexit 0\n");
        self.create_file(&format!("{name}/bld.bat"), "exit 0\r\n");
    }

    /// Run the channelci binary with the project as working directory
    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_channelci"))
            .current_dir(self.path())
            .env("CHANNELCI_CONFIG_DIR", self.config_dir.path())
            .env_remove("BINSTAR_TOKEN")
            .env_remove("CHANNELCI_CHANNEL")
            .env_remove("CHANNELCI_API_URL")
            .env_remove("CHANNELCI_CONDA")
            .env_remove("RUST_LOG")
            .args(args)
            .output()
            .expect("Failed to execute channelci")
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// `meta.yaml` for a recipe with the given build requirements
pub fn recipe_meta(name: &str, version: &str, deps: &[&str]) -> String {
    let mut meta = format!("package:\n  name: {name}\n  version: '{version}'\n\nbuild:\n  number: 0\n");
    if !deps.is_empty() {
        meta.push_str("\nrequirements:\n  build:\n");
        for dep in deps {
            meta.push_str(&format!("    - {dep}\n"));
        }
        meta.push_str("  run:\n    - python\n");
    }
    meta
}

/// Stdout of a finished command as a string
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Stderr of a finished command as a string
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}
