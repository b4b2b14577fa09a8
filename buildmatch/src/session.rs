// SPDX-License-Identifier: GPL-3.0-or-later

//! The matching session connects the pieces of the application.
//!
//! Configuring the session validates the arguments against the configuration
//! and takes the snapshot of the workspace. Running it reads the build output,
//! resolves the file references and writes the markers.

use crate::args;
use crate::config;
use crate::context::Context;
use crate::markers::{MarkerGenerator, ProblemMarker};
use crate::output::{OutputStatistics, OutputWriter, WriterCreationError};
use crate::parser::{DirectoryStack, OutputLine};
use crate::resolver::{BuildContext, PathResolver};
use crate::resource::{ResourceId, ResourceTree, ScanError, Scanner};
use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use thiserror::Error;

/// The project name used when the configuration does not define any.
const IMPLICIT_PROJECT_NAME: &str = "workspace";

pub struct Session {
    /// The absolute path of the build output, or `None` for the standard input.
    input: Option<PathBuf>,
    output: OutputWriter,
    tree: ResourceTree,
    resolver: PathResolver,
    project: ResourceId,
    build_directory: PathBuf,
    stats: Arc<OutputStatistics>,
}

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Failed to scan the workspace: {0}")]
    Scan(#[from] ScanError),
    #[error("Project not found in the workspace: {0}")]
    UnknownProject(String),
    #[error("Project is not specified, use --project to select one of: {}", .0.join(", "))]
    ProjectNotSpecified(Vec<String>),
    #[error("Build output file not found: {0}")]
    InputNotFound(PathBuf),
    #[error("Failed to create output: {0}")]
    OutputCreation(#[from] WriterCreationError),
}

impl Session {
    /// Validate the arguments against the configuration and prepare the run.
    pub fn configure(
        context: Context,
        arguments: args::Arguments,
        config: config::Main,
    ) -> Result<Self, ConfigurationError> {
        let workspace = Self::workspace(&context, &arguments, &config);
        let tree = Scanner::new(&workspace).scan()?;

        let project = Self::project(&tree, &workspace, arguments.project.as_deref())?;
        let build_directory = match &arguments.build_directory {
            Some(directory) => context.absolute(directory),
            None => tree
                .get(project)
                .location()
                .map(PathBuf::from)
                .unwrap_or_else(|| context.current_directory.clone()),
        };
        log::debug!("Project {}, build directory {}", tree.get(project).name(), build_directory.display());

        let input = Self::input(&context, &arguments.input)?;

        let stats = OutputStatistics::new();
        let output = OutputWriter::create(&arguments.output, Arc::clone(&stats))?;

        Ok(Self {
            input,
            output,
            tree,
            resolver: PathResolver::from(&config),
            project,
            build_directory,
            stats,
        })
    }

    /// The configured workspace, or an implicit project in the working directory.
    fn workspace(context: &Context, arguments: &args::Arguments, config: &config::Main) -> config::Workspace {
        if !config.workspace.projects.is_empty() {
            return config.workspace.clone();
        }

        let name = arguments
            .project
            .clone()
            .or_else(|| {
                context.current_directory.file_name().and_then(|name| name.to_str()).map(str::to_string)
            })
            .unwrap_or_else(|| IMPLICIT_PROJECT_NAME.to_string());
        log::info!("No projects configured, using {} at {}", name, context.current_directory.display());

        config::Workspace {
            projects: vec![config::Project { name, location: context.current_directory.clone(), links: vec![] }],
        }
    }

    /// The build output file as an absolute path, checked to exist.
    fn input(context: &Context, input: &args::BuildLog) -> Result<Option<PathBuf>, ConfigurationError> {
        if input.is_stdin() {
            return Ok(None);
        }
        let path = context.absolute(&input.file_name);
        if !path.is_file() {
            return Err(ConfigurationError::InputNotFound(path));
        }
        Ok(Some(path))
    }

    fn project(
        tree: &ResourceTree,
        workspace: &config::Workspace,
        name: Option<&str>,
    ) -> Result<ResourceId, ConfigurationError> {
        match (name, workspace.projects.as_slice()) {
            (Some(name), _) => {
                tree.project(name).ok_or_else(|| ConfigurationError::UnknownProject(name.to_string()))
            }
            (None, [single]) => {
                tree.project(&single.name).ok_or_else(|| ConfigurationError::UnknownProject(single.name.clone()))
            }
            (None, projects) => Err(ConfigurationError::ProjectNotSpecified(
                projects.iter().map(|project| project.name.clone()).collect(),
            )),
        }
    }

    /// Process the build output.
    ///
    /// Not finding the files of the diagnostics is not a failure, the
    /// run fails only when the input can't be read or the output can't
    /// be written.
    pub fn run(self) -> ExitCode {
        let reader = match Self::open(self.input.as_deref()) {
            Ok(reader) => reader,
            Err(error) => {
                log::error!("Failed to open build output: {error}");
                return ExitCode::FAILURE;
            }
        };

        let markers = MarkerStream {
            reader,
            generator: MarkerGenerator::new(&self.tree, &self.resolver),
            directories: DirectoryStack::new(&self.build_directory),
            project: self.project,
            stats: Arc::clone(&self.stats),
            finished: false,
        };

        match self.output.write(markers) {
            Ok(()) => ExitCode::SUCCESS,
            Err(error) => {
                log::error!("{error}");
                ExitCode::FAILURE
            }
        }
    }

    fn open<'a>(input: Option<&Path>) -> io::Result<Box<dyn BufRead + 'a>> {
        match input {
            None => Ok(Box::new(io::stdin().lock())),
            Some(path) => {
                let file = fs::File::open(path)
                    .map_err(|error| io::Error::new(error.kind(), format!("{}: {error}", path.display())))?;
                Ok(Box::new(io::BufReader::new(file)))
            }
        }
    }
}

/// Turns the lines of the build output into markers, as they are read.
///
/// An I/O error is yielded once, and ends the stream.
struct MarkerStream<'a> {
    reader: Box<dyn BufRead + 'a>,
    generator: MarkerGenerator<'a>,
    directories: DirectoryStack,
    project: ResourceId,
    stats: Arc<OutputStatistics>,
    finished: bool,
}

impl MarkerStream<'_> {
    fn next_line(&mut self) -> io::Result<Option<String>> {
        let mut buffer = Vec::new();
        if self.reader.read_until(b'\n', &mut buffer)? == 0 {
            return Ok(None);
        }
        self.stats.lines_read.fetch_add(1, Ordering::Relaxed);
        Ok(Some(String::from_utf8_lossy(&buffer).into_owned()))
    }

    fn log_directory(&self) {
        log::debug!("Build directory: {} (depth {})", self.directories.current().display(), self.directories.depth());
    }
}

impl Iterator for MarkerStream<'_> {
    type Item = io::Result<ProblemMarker>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            let line = match self.next_line() {
                Ok(Some(line)) => line,
                Ok(None) => {
                    self.finished = true;
                    break;
                }
                Err(error) => {
                    self.finished = true;
                    return Some(Err(error));
                }
            };
            match OutputLine::parse(&line) {
                OutputLine::Error(error) => {
                    self.stats.diagnostics_found.fetch_add(1, Ordering::Relaxed);
                    let context = BuildContext::new(self.project, self.directories.current());
                    let (marker, result) = self.generator.generate(&error, &context);
                    self.stats.record(&result);
                    return Some(Ok(marker));
                }
                OutputLine::EnterDirectory(directory) => {
                    self.stats.directory_changes.fetch_add(1, Ordering::Relaxed);
                    self.directories.enter(directory);
                    self.log_directory();
                }
                OutputLine::LeaveDirectory(_) => {
                    self.stats.directory_changes.fetch_add(1, Ordering::Relaxed);
                    self.directories.leave();
                    self.log_directory();
                }
                OutputLine::Other => {}
            }
        }
        None
    }
}
