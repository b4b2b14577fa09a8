// SPDX-License-Identifier: GPL-3.0-or-later

use anyhow::{Context as AnyhowContext, Result};
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

/// Environment variables which influence the behavior of the application.
const RELEVANT_VARIABLES: [&str; 3] = ["RUST_LOG", "RUST_LOG_STYLE", "CYGWIN"];

/// Application context containing runtime environment information.
///
/// Captured once at startup, so the later phases can work without
/// querying the process state again.
#[derive(Debug, Clone)]
pub struct Context {
    /// Path to the current executable
    pub current_executable: PathBuf,
    /// Current working directory when the application was invoked
    pub current_directory: PathBuf,
    /// All environment variables at startup
    pub environment: HashMap<String, String>,
}

impl Context {
    /// Capture the current application context.
    pub fn capture() -> Result<Self> {
        let current_executable = env::current_exe().with_context(|| "Failed to get current executable path")?;

        let current_directory =
            env::current_dir().with_context(|| "Failed to get current working directory")?;

        let environment = env::vars().collect::<HashMap<String, String>>();

        Ok(Context { current_executable, current_directory, environment })
    }

    /// Make the path absolute by joining it to the working directory.
    pub fn absolute(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() { path.to_path_buf() } else { self.current_directory.join(path) }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Application Context:")?;
        writeln!(f, "Current Executable: {}", self.current_executable.display())?;
        writeln!(f, "Current Directory: {}", self.current_directory.display())?;
        writeln!(f, "Total Environment Variables: {} entries", self.environment.len())?;

        writeln!(f, "Relevant Environment Variables:")?;
        for key in RELEVANT_VARIABLES {
            if let Some(value) = self.environment.get(key) {
                writeln!(f, "  {}={}", key, value)?;
            }
        }

        Ok(())
    }
}
