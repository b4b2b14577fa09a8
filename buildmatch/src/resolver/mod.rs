// SPDX-License-Identifier: GPL-3.0-or-later

//! This module resolves file references from the build output to resources.
//!
//! The build tools print file names in many forms: absolute paths, paths
//! relative to the directory they were running in, Cygwin style paths or
//! just the file name. The resolver tries the following rules in order,
//! the first one which gives an answer wins:
//!
//! 1. Cygwin path: translated to a host path, then looked up as absolute.
//!    When the translation is not possible, it continues as relative path.
//! 2. Absolute path: looked up by the physical location of the resources,
//!    as written first, then with the symbolic links on the disk resolved.
//! 3. Relative path: walked from the build directory in the logical tree
//!    (`../Project/...` can reach sibling projects), then by location.
//! 4. Name based search: the trailing segments of the fragment are matched
//!    against every file of the project.
//!
//! Not finding a file, or finding more than one, is a normal outcome.

mod cygwin;
mod fragment;

pub use cygwin::CygwinMapping;
pub use fragment::PathFragment;

use crate::config;
use crate::resource::{normalize, physical_spellings, ResourceId, ResourceTree};
use std::path::{Path, PathBuf};

/// The outcome of a resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MatchResult {
    /// Exactly one existing file matched.
    Unique(ResourceId),
    /// No existing file matched.
    NoMatch,
    /// More than one file matched and none of them is preferred.
    Ambiguous(Vec<ResourceId>),
}

impl MatchResult {
    pub fn resource(&self) -> Option<ResourceId> {
        match self {
            MatchResult::Unique(id) => Some(*id),
            _ => None,
        }
    }
}

/// Where the build output line was produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildContext {
    /// The project which is searched.
    pub project: ResourceId,
    /// The absolute path of the directory the tool was running in.
    pub build_directory: PathBuf,
}

impl BuildContext {
    pub fn new(project: ResourceId, build_directory: impl Into<PathBuf>) -> Self {
        Self { project, build_directory: build_directory.into() }
    }

    /// Context with the project location as build directory.
    pub fn for_project(tree: &ResourceTree, name: &str) -> Option<Self> {
        let project = tree.project(name)?;
        let location = tree.get(project).location()?.to_path_buf();
        Some(Self::new(project, location))
    }
}

/// Case sensitivity of the file name comparison.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CaseSensitivity {
    Sensitive,
    Insensitive,
}

impl CaseSensitivity {
    /// The convention of the file system on the current host.
    pub fn host() -> Self {
        if cfg!(windows) { CaseSensitivity::Insensitive } else { CaseSensitivity::Sensitive }
    }

    pub fn matches(&self, lhs: &str, rhs: &str) -> bool {
        match self {
            CaseSensitivity::Sensitive => lhs == rhs,
            CaseSensitivity::Insensitive => lhs == rhs || lhs.to_lowercase() == rhs.to_lowercase(),
        }
    }
}

impl From<config::CaseMatching> for CaseSensitivity {
    fn from(value: config::CaseMatching) -> Self {
        match value {
            config::CaseMatching::Auto => CaseSensitivity::host(),
            config::CaseMatching::Sensitive => CaseSensitivity::Sensitive,
            config::CaseMatching::Insensitive => CaseSensitivity::Insensitive,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PathResolver {
    case: CaseSensitivity,
    cygwin: CygwinMapping,
}

impl Default for PathResolver {
    fn default() -> Self {
        Self::new(CaseSensitivity::host(), CygwinMapping::default())
    }
}

impl From<&config::Main> for PathResolver {
    fn from(value: &config::Main) -> Self {
        Self::new(value.matching.case.into(), CygwinMapping::from(&value.cygwin))
    }
}

/// Where a relative walk in the logical tree stands.
#[derive(Copy, Clone, Debug)]
enum Position {
    Workspace,
    Resource(ResourceId),
}

impl PathResolver {
    pub fn new(case: CaseSensitivity, cygwin: CygwinMapping) -> Self {
        Self { case, cygwin }
    }

    pub fn resolve(&self, fragment: &PathFragment, context: &BuildContext, tree: &ResourceTree) -> MatchResult {
        let text = fragment.as_str();
        if text.is_empty() {
            return MatchResult::NoMatch;
        }

        if self.cygwin.is_cygwin_path(text) {
            match self.cygwin.translate(text).filter(|path| path.is_absolute()) {
                Some(path) => {
                    log::debug!("Cygwin path {text} translated to {}", path.display());
                    return self.resolve_absolute(&path, context, tree);
                }
                None => log::debug!("Cygwin path {text} can't be translated, continue as relative"),
            }
        } else if fragment.to_path().is_absolute() {
            return self.resolve_absolute(&fragment.to_path(), context, tree);
        }

        if let Some(found) = self.resolve_relative(fragment, context, tree) {
            log::debug!("Found {} relative to the build directory", tree.full_path(found));
            return MatchResult::Unique(found);
        }

        self.search(fragment, context, tree)
    }

    fn resolve_absolute(&self, path: &Path, context: &BuildContext, tree: &ResourceTree) -> MatchResult {
        match file_at(tree, path, context.project) {
            Some(found) => {
                log::debug!("Found {} at location {}", tree.full_path(found), path.display());
                MatchResult::Unique(found)
            }
            None => {
                log::debug!("No resource at location {}", path.display());
                MatchResult::NoMatch
            }
        }
    }

    fn resolve_relative(
        &self,
        fragment: &PathFragment,
        context: &BuildContext,
        tree: &ResourceTree,
    ) -> Option<ResourceId> {
        let build_directory = normalize(&context.build_directory);
        let segments = fragment.segments();

        let walked = at_location(&build_directory, |location| tree.container_at_location(location, context.project))
            .and_then(|start| self.walk(tree, start, &segments))
            .filter(|id| tree.get(*id).is_file());
        if walked.is_some() {
            return walked;
        }

        // The build directory might be outside of the workspace tree.
        let location: PathBuf = segments.iter().fold(build_directory, |path, segment| path.join(segment));
        file_at(tree, &location, context.project)
    }

    fn walk(&self, tree: &ResourceTree, start: ResourceId, segments: &[&str]) -> Option<ResourceId> {
        let mut position = Position::Resource(start);
        for segment in segments {
            position = match (*segment, position) {
                (".", _) => position,
                ("..", Position::Resource(id)) => match tree.get(id).parent() {
                    Some(parent) => Position::Resource(parent),
                    None => Position::Workspace,
                },
                ("..", Position::Workspace) => return None,
                (name, Position::Workspace) => Position::Resource(self.project(tree, name)?),
                (name, Position::Resource(id)) => Position::Resource(self.child(tree, id, name)?),
            };
        }
        match position {
            Position::Resource(id) => Some(id),
            Position::Workspace => None,
        }
    }

    fn project(&self, tree: &ResourceTree, name: &str) -> Option<ResourceId> {
        tree.project(name).or_else(|| {
            single(tree.projects().filter(|(candidate, _)| self.case.matches(candidate, name)))
        })
    }

    fn child(&self, tree: &ResourceTree, parent: ResourceId, name: &str) -> Option<ResourceId> {
        tree.child(parent, name).or_else(|| {
            single(tree.children(parent).filter(|(candidate, _)| self.case.matches(candidate, name)))
        })
    }

    fn search(&self, fragment: &PathFragment, context: &BuildContext, tree: &ResourceTree) -> MatchResult {
        let wanted = fragment.trailing_segments();
        if wanted.is_empty() {
            return MatchResult::NoMatch;
        }

        let matches: Vec<ResourceId> = tree
            .files(context.project)
            .into_iter()
            .filter(|id| ends_with(&tree.segments(*id), &wanted, self.case))
            .collect();
        log::trace!("Candidates for {fragment}: {matches:?}");

        match matches.as_slice() {
            [] => MatchResult::NoMatch,
            [single] => MatchResult::Unique(*single),
            _ => self.prefer(fragment, &wanted, matches, context, tree),
        }
    }

    fn prefer(
        &self,
        fragment: &PathFragment,
        wanted: &[&str],
        matches: Vec<ResourceId>,
        context: &BuildContext,
        tree: &ResourceTree,
    ) -> MatchResult {
        if self.case == CaseSensitivity::Insensitive {
            let exact: Vec<ResourceId> = matches
                .iter()
                .copied()
                .filter(|id| ends_with(&tree.segments(*id), wanted, CaseSensitivity::Sensitive))
                .collect();
            if let [single] = exact.as_slice() {
                log::debug!("Preferring exact case match {}", tree.full_path(*single));
                return MatchResult::Unique(*single);
            }
        }

        if fragment.is_bare() {
            let in_root: Vec<ResourceId> = matches
                .iter()
                .copied()
                .filter(|id| tree.get(*id).parent() == Some(context.project))
                .collect();
            if let [single] = in_root.as_slice() {
                log::debug!("Preferring project root match {}", tree.full_path(*single));
                return MatchResult::Unique(*single);
            }
        }

        log::debug!("Ambiguous reference {fragment}: {} candidates", matches.len());
        MatchResult::Ambiguous(matches)
    }
}

fn file_at(tree: &ResourceTree, path: &Path, preferred: ResourceId) -> Option<ResourceId> {
    at_location(path, |location| tree.file_at_location(location, preferred))
}

/// Look up the path as written, and only on a miss with the symbolic links resolved.
fn at_location(path: &Path, lookup: impl Fn(&Path) -> Option<ResourceId>) -> Option<ResourceId> {
    let lexical = normalize(path);
    lookup(&lexical).or_else(|| physical_spellings(&lexical).iter().skip(1).find_map(|location| lookup(location)))
}

/// The only candidate, or `None` when there are zero or many.
fn single<'t>(mut candidates: impl Iterator<Item = (&'t str, ResourceId)>) -> Option<ResourceId> {
    let (_, first) = candidates.next()?;
    match candidates.next() {
        None => Some(first),
        Some(_) => None,
    }
}

fn ends_with(segments: &[&str], wanted: &[&str], case: CaseSensitivity) -> bool {
    segments.len() >= wanted.len()
        && segments[segments.len() - wanted.len()..]
            .iter()
            .zip(wanted)
            .all(|(segment, wanted)| case.matches(segment, wanted))
}
