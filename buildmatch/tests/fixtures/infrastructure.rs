// SPDX-License-Identifier: GPL-3.0-or-later

//! Test infrastructure for the integration tests.
//!
//! A `TestEnvironment` owns a temporary directory, which holds the source
//! tree of the projects, the build output and the configuration file. The
//! executable runs with this directory as its working directory.

use anyhow::{Context, Result};
use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Output;

pub const BUILDMATCH_BIN: &str = "buildmatch";

#[derive(Debug)]
pub struct TestEnvironment {
    temp_dir: TempDir,
    root: PathBuf,
}

impl TestEnvironment {
    /// Create a new test environment
    pub fn new(test_name: &str) -> Result<Self> {
        let temp_dir = TempDir::new().with_context(|| format!("Failed to create temp dir for test: {test_name}"))?;
        // Resolve the symbolic links of the temporary directory (like `/tmp` on macOS).
        let root = temp_dir.path().canonicalize()?;
        Ok(Self { temp_dir, root })
    }

    /// The root directory of the environment.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create files with content, relative to the root directory.
    pub fn create_source_files(&self, files: &[(&str, &str)]) -> Result<()> {
        for (path, content) in files {
            self.temp_dir.child(path).write_str(content).with_context(|| format!("Failed to write file: {path}"))?;
        }
        Ok(())
    }

    /// Create a build output file, relative to the root directory.
    pub fn create_build_log(&self, name: &str, lines: &[&str]) -> Result<PathBuf> {
        let mut content = lines.join("\n");
        content.push('\n');
        self.temp_dir.child(name).write_str(&content)?;
        Ok(self.root.join(name))
    }

    /// Write the configuration file with the default name into the root directory.
    pub fn create_config(&self, config_yaml: &str) -> Result<PathBuf> {
        self.temp_dir.child("buildmatch.yml").write_str(config_yaml)?;
        Ok(self.root.join("buildmatch.yml"))
    }

    /// Configuration with one project per directory name, located under the root.
    pub fn projects_config(&self, names: &[&str]) -> String {
        let mut yaml = String::from("schema: 1.0\nworkspace:\n  projects:\n");
        for name in names {
            let location = self.root.join(name);
            yaml.push_str(&format!("    - name: {name}\n      location: '{}'\n", location.display()));
        }
        yaml
    }

    /// Run the executable with the given arguments
    pub fn run(&self, args: &[&str]) -> Result<RunOutput> {
        self.run_with_stdin(args, "")
    }

    /// Run the executable with the given arguments, feeding the standard input.
    pub fn run_with_stdin(&self, args: &[&str], stdin: &str) -> Result<RunOutput> {
        let output = Command::new(cargo_bin(BUILDMATCH_BIN))
            .current_dir(self.root())
            .env("RUST_LOG", "debug")
            .env("RUST_BACKTRACE", "1")
            .args(args)
            .write_stdin(stdin)
            .output()?;

        Ok(RunOutput { output })
    }

    /// Read the markers from a result file of the environment.
    pub fn load_markers(&self, name: &str) -> Result<Markers> {
        let content = std::fs::read_to_string(self.root.join(name))
            .with_context(|| format!("Failed to read the result file: {name}"))?;
        Markers::parse(&content)
    }
}

/// Output of a single execution.
#[derive(Debug)]
pub struct RunOutput {
    output: Output,
}

impl RunOutput {
    pub fn assert_success(&self) -> Result<()> {
        if !self.output.status.success() {
            anyhow::bail!(
                "Command failed with exit code: {:?}\nstdout: {}\nstderr: {}",
                self.output.status.code(),
                self.stdout(),
                self.stderr()
            );
        }
        Ok(())
    }

    pub fn assert_failure(&self) -> Result<()> {
        if self.output.status.success() {
            anyhow::bail!("Expected the command to fail, but it succeeded\nstderr: {}", self.stderr());
        }
        Ok(())
    }

    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).to_string()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).to_string()
    }

    /// Parse the standard output as markers.
    pub fn markers(&self) -> Result<Markers> {
        Markers::parse(&self.stdout())
    }
}

/// The problem markers of a run, as plain JSON values.
#[derive(Debug)]
pub struct Markers {
    entries: Vec<Value>,
}

impl Markers {
    fn parse(content: &str) -> Result<Self> {
        let entries: Vec<Value> =
            serde_json::from_str(content).with_context(|| format!("Output is not a JSON array: {content}"))?;
        Ok(Self { entries })
    }

    pub fn assert_count(&self, expected: usize) -> Result<()> {
        if self.entries.len() != expected {
            anyhow::bail!("Expected {expected} markers, found {}: {:#?}", self.entries.len(), self.entries);
        }
        Ok(())
    }

    pub fn get(&self, index: usize) -> &Value {
        &self.entries[index]
    }

    /// The `[kind, path]` pair of the marker resource.
    pub fn resource(&self, index: usize) -> (String, String) {
        let resource = &self.entries[index]["resource"];
        let (kind, value) = if let Some(file) = resource.get("file") {
            ("file", file)
        } else {
            ("project", &resource["project"])
        };
        (kind.to_string(), value.as_str().unwrap_or_default().to_string())
    }
}
