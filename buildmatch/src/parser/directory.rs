// SPDX-License-Identifier: GPL-3.0-or-later

use crate::resource::normalize;
use std::path::{Path, PathBuf};

/// Tracks the working directory of a recursive `make` run.
///
/// The stack never gets below the directory where the build was started,
/// unbalanced `Leaving directory` lines are ignored.
#[derive(Clone, Debug)]
pub struct DirectoryStack {
    base: PathBuf,
    entered: Vec<PathBuf>,
}

impl DirectoryStack {
    pub fn new(base: impl AsRef<Path>) -> Self {
        Self { base: normalize(base.as_ref()), entered: Vec::new() }
    }

    /// The directory the relative file references are relative to.
    pub fn current(&self) -> &Path {
        self.entered.last().unwrap_or(&self.base)
    }

    /// Push a directory, a relative one is resolved against the current one.
    pub fn enter(&mut self, directory: impl AsRef<Path>) -> &Path {
        let directory = normalize(&self.current().join(directory.as_ref()));
        log::debug!("Entering directory {}", directory.display());
        self.entered.push(directory);
        self.current()
    }

    pub fn leave(&mut self) -> &Path {
        match self.entered.pop() {
            Some(directory) => log::debug!("Leaving directory {}", directory.display()),
            None => log::debug!("Leaving directory without entering one, ignored"),
        }
        self.current()
    }

    pub fn depth(&self) -> usize {
        self.entered.len()
    }
}
