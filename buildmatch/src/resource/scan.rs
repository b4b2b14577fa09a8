// SPDX-License-Identifier: GPL-3.0-or-later

//! Builds the resource tree from the file system.
//!
//! Every configured project location is resolved to its canonical form and
//! walked recursively. Symbolic links
//! are recorded with their canonical target; folder links are descended into
//! unless the target is already on the current walk (link cycle). Dangling
//! links are kept as files without a physical location. The configured linked
//! resources are added after the walk, linked folders are populated from
//! their target directory.

use super::{ResourceKind, ResourceTree, TreeBuilder, TreeError};
use crate::config;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub struct Scanner<'a> {
    workspace: &'a config::Workspace,
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Location of project {name} is not accessible {path}: {source}")]
    ProjectLocation {
        name: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Location of project {name} is not a directory: {path}")]
    NotADirectory { name: String, path: PathBuf },
    #[error("Failed to build the resource tree: {0}")]
    Tree(#[from] TreeError),
}

impl<'a> Scanner<'a> {
    pub fn new(workspace: &'a config::Workspace) -> Self {
        Self { workspace }
    }

    pub fn scan(&self) -> Result<ResourceTree, ScanError> {
        let mut builder = ResourceTree::builder();
        for project in &self.workspace.projects {
            log::debug!("Scanning project {} at {}", project.name, project.location.display());

            let location = fs::canonicalize(&project.location).map_err(|source| ScanError::ProjectLocation {
                name: project.name.clone(),
                path: project.location.clone(),
                source,
            })?;
            if !location.is_dir() {
                return Err(ScanError::NotADirectory {
                    name: project.name.clone(),
                    path: project.location.clone(),
                });
            }
            if location != project.location {
                log::debug!("Location of project {} resolved to {}", project.name, location.display());
            }

            builder.project(&project.name, &location)?;
            let mut walk = Walk::new(&mut builder, &project.name);
            walk.directory("", &location)?;

            for link in &project.links {
                walk.link(link)?;
            }
        }
        let tree = builder.build();
        log::debug!("Resource tree contains {} projects", tree.projects().count());
        Ok(tree)
    }
}

struct Walk<'b> {
    builder: &'b mut TreeBuilder,
    project: &'b str,
    // canonical paths of the directories on the current walk
    ancestors: HashSet<PathBuf>,
}

impl<'b> Walk<'b> {
    fn new(builder: &'b mut TreeBuilder, project: &'b str) -> Self {
        Self { builder, project, ancestors: HashSet::new() }
    }

    fn directory(&mut self, prefix: &str, directory: &Path) -> Result<(), ScanError> {
        let canonical = fs::canonicalize(directory).unwrap_or_else(|_| directory.to_path_buf());
        if !self.ancestors.insert(canonical.clone()) {
            log::debug!("Symbolic link cycle detected at {}, not descending", directory.display());
            return Ok(());
        }
        let result = self.entries(prefix, directory);
        self.ancestors.remove(&canonical);
        result
    }

    fn entries(&mut self, prefix: &str, directory: &Path) -> Result<(), ScanError> {
        let mut entries: Vec<fs::DirEntry> = match fs::read_dir(directory) {
            Ok(entries) => entries
                .filter_map(|entry| {
                    entry.map_err(|error| log::warn!("Failed to read entry: {error}")).ok()
                })
                .collect(),
            Err(error) => {
                log::warn!("Failed to read directory {}: {error}", directory.display());
                return Ok(());
            }
        };
        entries.sort_by_key(fs::DirEntry::file_name);

        for entry in entries {
            let path = entry.path();
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                log::warn!("Skipping entry with non UTF-8 name: {}", path.display());
                continue;
            };
            let relative = if prefix.is_empty() { name } else { format!("{prefix}/{name}") };

            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(error) => {
                    log::warn!("Failed to query {}: {error}", path.display());
                    continue;
                }
            };

            if file_type.is_symlink() {
                self.symbolic_link(&relative, &path)?;
            } else if file_type.is_dir() {
                self.builder.folder(self.project, &relative)?;
                self.directory(&relative, &path)?;
            } else {
                self.builder.file(self.project, &relative)?;
            }
        }
        Ok(())
    }

    fn symbolic_link(&mut self, relative: &str, path: &Path) -> Result<(), ScanError> {
        match fs::canonicalize(path) {
            Ok(target) if target.is_dir() => {
                self.builder.symbolic_link(self.project, relative, ResourceKind::Folder, &target, true)?;
                self.directory(relative, &target)
            }
            Ok(target) => {
                self.builder.symbolic_link(self.project, relative, ResourceKind::File, &target, true)?;
                Ok(())
            }
            Err(_) => {
                let target = fs::read_link(path).unwrap_or_default();
                log::debug!("Dangling symbolic link {} -> {}", path.display(), target.display());
                self.builder.symbolic_link(self.project, relative, ResourceKind::File, &target, false)?;
                Ok(())
            }
        }
    }

    fn link(&mut self, link: &config::Link) -> Result<(), ScanError> {
        let relative = link
            .path
            .split('/')
            .filter(|segment| !segment.is_empty() && *segment != ".")
            .collect::<Vec<_>>()
            .join("/");

        match fs::canonicalize(&link.target) {
            Ok(target) if target.is_dir() => {
                self.builder.linked_folder(self.project, &relative, &target)?;
                self.directory(&relative, &target)
            }
            Ok(target) => {
                self.builder.linked_file(self.project, &relative, &target)?;
                Ok(())
            }
            Err(error) => {
                log::warn!(
                    "Linked resource /{}/{} is skipped, target {} is not accessible: {error}",
                    self.project,
                    relative,
                    link.target.display()
                );
                Ok(())
            }
        }
    }
}
