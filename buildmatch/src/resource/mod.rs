// SPDX-License-Identifier: GPL-3.0-or-later

//! This module holds the snapshot of the workspace which is used to resolve
//! file references from the build output.
//!
//! The snapshot is a forest of projects. Every project owns a tree of folders
//! and files. A resource is either located physically under its parent, or it
//! is a linked resource (the workspace redirects it to another location), or
//! it is a symbolic link on the file system. The tree keeps an index of the
//! physical locations, so a path from the build output can be looked up
//! directly. A resource under a symbolic link is indexed by its resolved
//! location and by the location through the link as well.
//!
//! The tree can be built programmatically (`TreeBuilder`) or from the disk
//! with the help of the configuration (`Scanner`).

mod scan;
mod tree;

pub use scan::{ScanError, Scanner};
pub use tree::{Link, Resource, ResourceId, ResourceKind, ResourceTree, TreeBuilder, TreeError};

use std::fs;
use std::path::{Component, Path, PathBuf};

/// Lexically normalize the path.
///
/// Removes the `.` components and resolves the `..` components against the
/// preceding normal component. A `..` after the root (or prefix) is dropped,
/// a leading `..` of a relative path is kept. The file system is not accessed.
pub fn normalize(path: &Path) -> PathBuf {
    let mut components: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => components.push(component),
            },
            _ => components.push(component),
        }
    }
    components.iter().collect()
}

/// The spellings of a location to look up in the physical index.
///
/// The lexically normalized path comes first. When the path exists, it is
/// followed by the path with the parent folders resolved (the last component
/// is kept, so a symbolic link file stays itself), then the fully resolved
/// path. Duplicates are removed.
pub fn physical_spellings(path: &Path) -> Vec<PathBuf> {
    let lexical = normalize(path);
    let through_parent = match (lexical.parent(), lexical.file_name()) {
        (Some(parent), Some(name)) => fs::canonicalize(parent).ok().map(|parent| parent.join(name)),
        _ => None,
    };
    let resolved = fs::canonicalize(&lexical).ok();

    let mut result = vec![lexical];
    for candidate in [through_parent, resolved].into_iter().flatten() {
        if !result.contains(&candidate) {
            result.push(candidate);
        }
    }
    result
}
