// SPDX-License-Identifier: GPL-3.0-or-later

//! Problem markers are the diagnostics attached to a workspace resource.
//!
//! When the file reference of a diagnostic resolves to exactly one file,
//! the marker is attached to that file. Otherwise it is attached to the
//! project of the build, and the file reference as written is kept in the
//! description, so the information is not lost.

use crate::parser::ErrorLine;
use crate::resolver::{BuildContext, MatchResult, PathFragment, PathResolver};
use crate::resource::ResourceTree;
use serde::Serialize;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Error,
    Warning,
    Info,
}

impl Severity {
    /// Map the severity keyword a compiler prints. Unknown keywords are errors.
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword.trim().to_lowercase().as_str() {
            "warning" => Severity::Warning,
            "note" | "info" => Severity::Info,
            _ => Severity::Error,
        }
    }
}

/// The resource the marker is attached to, by its logical path.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerResource {
    File(String),
    Project(String),
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ProblemMarker {
    pub resource: MarkerResource,
    pub line: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    pub severity: Severity,
    pub description: String,
    /// The logical paths of the files the reference could mean.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<String>,
}

pub struct MarkerGenerator<'a> {
    tree: &'a ResourceTree,
    resolver: &'a PathResolver,
}

impl<'a> MarkerGenerator<'a> {
    pub fn new(tree: &'a ResourceTree, resolver: &'a PathResolver) -> Self {
        Self { tree, resolver }
    }

    /// Resolve the file reference of the line and create the marker for it.
    pub fn generate(&self, error: &ErrorLine, context: &BuildContext) -> (ProblemMarker, MatchResult) {
        let fragment = PathFragment::new(error.fragment.as_str());
        let result = self.resolver.resolve(&fragment, context, self.tree);

        let (resource, description, candidates) = match &result {
            MatchResult::Unique(id) => {
                (MarkerResource::File(self.tree.full_path(*id)), error.description.clone(), vec![])
            }
            MatchResult::NoMatch => {
                log::debug!("No file found for {fragment}");
                (self.project(context), format!("{fragment} {}", error.description), vec![])
            }
            MatchResult::Ambiguous(ids) => {
                let candidates = ids.iter().map(|id| self.tree.full_path(*id)).collect();
                (self.project(context), format!("{fragment} {}", error.description), candidates)
            }
        };

        let marker = ProblemMarker {
            resource,
            line: error.line,
            column: error.column,
            severity: error.severity,
            description,
            candidates,
        };
        (marker, result)
    }

    fn project(&self, context: &BuildContext) -> MarkerResource {
        let project = self.tree.get(context.project).project();
        MarkerResource::Project(self.tree.get(project).name().to_string())
    }
}
