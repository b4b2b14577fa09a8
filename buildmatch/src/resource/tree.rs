// SPDX-License-Identifier: GPL-3.0-or-later

use super::normalize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Handle of a resource in a `ResourceTree`.
///
/// Only valid for the tree which produced it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(usize);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ResourceKind {
    Project,
    Folder,
    File,
}

/// How the physical location of a resource is derived.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Link {
    /// The resource is located under the location of its parent.
    None,
    /// The workspace redirects the resource to the given location.
    Linked(PathBuf),
    /// The resource is a symbolic link on the file system.
    ///
    /// The target is the resolved location, `exists` tells whether it
    /// was present at the time the snapshot was taken.
    Symbolic { target: PathBuf, exists: bool },
}

#[derive(Clone, Debug)]
pub struct Resource {
    name: String,
    kind: ResourceKind,
    parent: Option<ResourceId>,
    project: ResourceId,
    link: Link,
    location: Option<PathBuf>,
    // locations through symbolic links, which resolve to the location
    aliases: Vec<PathBuf>,
    children: BTreeMap<String, ResourceId>,
}

impl Resource {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn is_file(&self) -> bool {
        self.kind == ResourceKind::File
    }

    pub fn is_container(&self) -> bool {
        self.kind != ResourceKind::File
    }

    /// The parent resource, `None` for projects.
    pub fn parent(&self) -> Option<ResourceId> {
        self.parent
    }

    /// The project which owns this resource. Projects own themselves.
    pub fn project(&self) -> ResourceId {
        self.project
    }

    pub fn link(&self) -> &Link {
        &self.link
    }

    /// The physical location of the resource.
    ///
    /// It is `None` when the location can't be resolved: a dangling
    /// symbolic link, or anything under it.
    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }
}

/// Immutable snapshot of the workspace.
#[derive(Clone, Debug, Default)]
pub struct ResourceTree {
    resources: Vec<Resource>,
    projects: BTreeMap<String, ResourceId>,
    locations: HashMap<PathBuf, Vec<ResourceId>>,
}

impl ResourceTree {
    pub fn builder() -> TreeBuilder {
        TreeBuilder::default()
    }

    pub fn get(&self, id: ResourceId) -> &Resource {
        &self.resources[id.0]
    }

    pub fn project(&self, name: &str) -> Option<ResourceId> {
        self.projects.get(name).copied()
    }

    pub fn projects(&self) -> impl Iterator<Item = (&str, ResourceId)> {
        self.projects.iter().map(|(name, id)| (name.as_str(), *id))
    }

    pub fn child(&self, parent: ResourceId, name: &str) -> Option<ResourceId> {
        self.get(parent).children.get(name).copied()
    }

    pub fn children(&self, parent: ResourceId) -> impl Iterator<Item = (&str, ResourceId)> {
        self.get(parent).children.iter().map(|(name, id)| (name.as_str(), *id))
    }

    /// The segments of the logical path relative to the owning project.
    pub fn segments(&self, id: ResourceId) -> Vec<&str> {
        let mut result = Vec::new();
        let mut current = self.get(id);
        while let Some(parent) = current.parent {
            result.push(current.name.as_str());
            current = self.get(parent);
        }
        result.reverse();
        result
    }

    /// The logical path of the resource in the workspace, like `/Project/Folder/file.c`.
    pub fn full_path(&self, id: ResourceId) -> String {
        let resource = self.get(id);
        let mut result = format!("/{}", self.get(resource.project).name);
        for segment in self.segments(id) {
            result.push('/');
            result.push_str(segment);
        }
        result
    }

    /// Tells whether the resource or any of its ancestors is a link.
    pub fn is_linked(&self, id: ResourceId) -> bool {
        let mut current = Some(id);
        while let Some(id) = current {
            let resource = self.get(id);
            if resource.link != Link::None {
                return true;
            }
            current = resource.parent;
        }
        false
    }

    /// All files of the project in depth-first order.
    pub fn files(&self, project: ResourceId) -> Vec<ResourceId> {
        let mut result = Vec::new();
        let mut stack = vec![project];
        while let Some(id) = stack.pop() {
            let resource = self.get(id);
            if resource.is_file() {
                result.push(id);
            }
            stack.extend(resource.children.values().rev());
        }
        result
    }

    /// All resources which are physically located at the given path.
    pub fn find_by_location(&self, location: &Path) -> &[ResourceId] {
        self.locations.get(location).map(Vec::as_slice).unwrap_or_default()
    }

    /// Select one file which is physically located at the given path.
    ///
    /// When multiple logical resources point to the same location, the one
    /// from the preferred project wins, then the ones which are not linked,
    /// then the shorter logical path.
    pub fn file_at_location(&self, location: &Path, preferred: ResourceId) -> Option<ResourceId> {
        self.select(location, preferred, Resource::is_file)
    }

    /// Select one project or folder which is physically located at the given path.
    pub fn container_at_location(&self, location: &Path, preferred: ResourceId) -> Option<ResourceId> {
        self.select(location, preferred, Resource::is_container)
    }

    fn select(
        &self,
        location: &Path,
        preferred: ResourceId,
        predicate: impl Fn(&Resource) -> bool,
    ) -> Option<ResourceId> {
        self.find_by_location(location)
            .iter()
            .copied()
            .filter(|id| predicate(self.get(*id)))
            .min_by_key(|id| {
                (
                    self.get(*id).project != preferred,
                    self.is_linked(*id),
                    self.segments(*id).len(),
                    self.full_path(*id),
                )
            })
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum TreeError {
    #[error("Project already exists: {0}")]
    DuplicateProject(String),
    #[error("Project not found: {0}")]
    UnknownProject(String),
    #[error("Empty resource path in project {0}")]
    EmptyPath(String),
    #[error("Resource {0} is a file, it can't have children")]
    NotAFolder(String),
    #[error("Resource {0} already exists with a different kind")]
    Conflict(String),
}

/// Collects the resources of a workspace and produces the immutable tree.
///
/// Resource paths are relative to the project and use `/` as separator.
/// Missing parent folders are created on the fly.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    resources: Vec<Resource>,
    projects: BTreeMap<String, ResourceId>,
}

impl TreeBuilder {
    pub fn project(&mut self, name: &str, location: impl AsRef<Path>) -> Result<ResourceId, TreeError> {
        if self.projects.contains_key(name) {
            return Err(TreeError::DuplicateProject(name.to_string()));
        }
        let id = ResourceId(self.resources.len());
        self.resources.push(Resource {
            name: name.to_string(),
            kind: ResourceKind::Project,
            parent: None,
            project: id,
            link: Link::None,
            location: Some(normalize(location.as_ref())),
            aliases: vec![],
            children: BTreeMap::new(),
        });
        self.projects.insert(name.to_string(), id);
        Ok(id)
    }

    pub fn folder(&mut self, project: &str, path: &str) -> Result<ResourceId, TreeError> {
        self.insert(project, path, ResourceKind::Folder, Link::None)
    }

    pub fn file(&mut self, project: &str, path: &str) -> Result<ResourceId, TreeError> {
        self.insert(project, path, ResourceKind::File, Link::None)
    }

    pub fn linked_folder(
        &mut self,
        project: &str,
        path: &str,
        target: impl AsRef<Path>,
    ) -> Result<ResourceId, TreeError> {
        let link = Link::Linked(target.as_ref().to_path_buf());
        self.insert(project, path, ResourceKind::Folder, link)
    }

    pub fn linked_file(
        &mut self,
        project: &str,
        path: &str,
        target: impl AsRef<Path>,
    ) -> Result<ResourceId, TreeError> {
        let link = Link::Linked(target.as_ref().to_path_buf());
        self.insert(project, path, ResourceKind::File, link)
    }

    /// Add a symbolic link. A relative target is resolved against the parent folder.
    pub fn symbolic_link(
        &mut self,
        project: &str,
        path: &str,
        kind: ResourceKind,
        target: impl AsRef<Path>,
        exists: bool,
    ) -> Result<ResourceId, TreeError> {
        let link = Link::Symbolic { target: target.as_ref().to_path_buf(), exists };
        self.insert(project, path, kind, link)
    }

    pub fn build(self) -> ResourceTree {
        let mut locations: HashMap<PathBuf, Vec<ResourceId>> = HashMap::new();
        for (index, resource) in self.resources.iter().enumerate() {
            for location in resource.location.iter().chain(&resource.aliases) {
                let entry = locations.entry(location.clone()).or_default();
                if !entry.contains(&ResourceId(index)) {
                    entry.push(ResourceId(index));
                }
            }
        }
        ResourceTree { resources: self.resources, projects: self.projects, locations }
    }

    fn insert(
        &mut self,
        project: &str,
        path: &str,
        kind: ResourceKind,
        link: Link,
    ) -> Result<ResourceId, TreeError> {
        let project_id = self
            .projects
            .get(project)
            .copied()
            .ok_or_else(|| TreeError::UnknownProject(project.to_string()))?;

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty() && *s != ".").collect();
        let Some((name, folders)) = segments.split_last() else {
            return Err(TreeError::EmptyPath(project.to_string()));
        };

        let mut parent = project_id;
        for (index, folder) in folders.iter().enumerate() {
            parent = match self.resources[parent.0].children.get(*folder) {
                Some(existing) if self.resources[existing.0].is_file() => {
                    let path = folders[..=index].join("/");
                    return Err(TreeError::NotAFolder(format!("/{project}/{path}")));
                }
                Some(existing) => *existing,
                None => self.push(parent, folder, ResourceKind::Folder, Link::None),
            };
        }

        match self.resources[parent.0].children.get(*name) {
            Some(existing) => {
                let existing_resource = &self.resources[existing.0];
                if existing_resource.kind == kind && existing_resource.link == link {
                    Ok(*existing)
                } else {
                    Err(TreeError::Conflict(format!("/{project}/{}", segments.join("/"))))
                }
            }
            None => Ok(self.push(parent, name, kind, link)),
        }
    }

    fn push(&mut self, parent: ResourceId, name: &str, kind: ResourceKind, link: Link) -> ResourceId {
        let parent_resource = &self.resources[parent.0];
        let parent_location = parent_resource.location.clone();
        let project = parent_resource.project;

        // Seen from the parent, through the symbolic links above it.
        let through_parent: Vec<PathBuf> =
            parent_resource.location.iter().chain(&parent_resource.aliases).map(|path| path.join(name)).collect();

        let location = match &link {
            Link::None => parent_location.map(|location| location.join(name)),
            Link::Linked(target) => Some(normalize(target)),
            Link::Symbolic { target, exists: true } => match parent_location {
                Some(location) => Some(normalize(&location.join(target))),
                None if target.is_absolute() => Some(normalize(target)),
                None => None,
            },
            Link::Symbolic { exists: false, .. } => None,
        };
        let aliases = match (&link, &location) {
            (Link::Linked(_), _) | (_, None) => vec![],
            (_, Some(location)) => through_parent.into_iter().filter(|path| path != location).collect(),
        };

        let id = ResourceId(self.resources.len());
        self.resources.push(Resource {
            name: name.to_string(),
            kind,
            parent: Some(parent),
            project,
            link,
            location,
            aliases,
            children: BTreeMap::new(),
        });
        self.resources[parent.0].children.insert(name.to_string(), id);
        id
    }
}
