// SPDX-License-Identifier: GPL-3.0-or-later

//! This module defines the configuration of the application.
//!
//! The configuration is either loaded from a file or used with default
//! values, which are defined in the code. It describes the workspace the
//! build output is matched against, and how file names are compared.
//!
//! The configuration file syntax is based on the YAML format.
//! The default configuration file name is `buildmatch.yml`.
//!
//! The configuration file location is searched in the following order:
//! 1. The current working directory
//! 2. The local configuration directory of the user
//! 3. The configuration directory of the user
//! 4. The local configuration directory of the application
//! 5. The configuration directory of the application
//!
//! ```yaml
//! schema: 1.0
//!
//! workspace:
//!   projects:
//!     - name: firmware
//!       location: /home/user/work/firmware
//!       links:
//!         - path: external/hal
//!           target: /opt/vendor/hal
//!     - name: tools
//!       location: /home/user/work/tools
//!
//! matching:
//!   case: insensitive
//!
//! cygwin:
//!   cygdrive: /cygdrive
//!   mounts:
//!     - prefix: /usr/include
//!       target: C:/cygwin64/usr/include
//! ```

// Re-Export the types and the loader module content.
pub use loader::{ConfigError, Loader};
pub use types::*;
pub use validation::Validator;

mod types {
    use serde::Deserialize;
    use std::fmt;
    use std::path::PathBuf;

    /// Represents the application configuration.
    #[derive(Debug, PartialEq, serde::Deserialize, serde::Serialize)]
    pub struct Main {
        #[serde(deserialize_with = "validate_schema_version", default = "default_schema")]
        pub schema: String,
        #[serde(default)]
        pub workspace: Workspace,
        #[serde(default)]
        pub matching: Matching,
        #[serde(default)]
        pub cygwin: Cygwin,
    }

    impl Default for Main {
        fn default() -> Self {
            Self {
                schema: default_schema(),
                workspace: Workspace::default(),
                matching: Matching::default(),
                cygwin: Cygwin::default(),
            }
        }
    }

    impl fmt::Display for Main {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            writeln!(f, "Configuration:")?;
            let yaml_string = serde_yml::to_string(self).map_err(|_| fmt::Error)?;
            for line in yaml_string.lines() {
                writeln!(f, "{}", line)?;
            }
            Ok(())
        }
    }

    /// The projects which are visible for the matching.
    #[derive(Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize)]
    pub struct Workspace {
        #[serde(default)]
        pub projects: Vec<Project>,
    }

    /// A project is a named directory tree.
    #[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
    pub struct Project {
        pub name: String,
        pub location: PathBuf,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub links: Vec<Link>,
    }

    /// A linked resource: the project sees the target under the given path.
    ///
    /// The path is relative to the project, the target is an absolute path
    /// to a file or a directory.
    #[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
    pub struct Link {
        pub path: String,
        pub target: PathBuf,
    }

    #[derive(Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize)]
    pub struct Matching {
        #[serde(default)]
        pub case: CaseMatching,
    }

    /// How the file names are compared.
    #[derive(Copy, Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
    #[serde(rename_all = "lowercase")]
    pub enum CaseMatching {
        /// Follow the convention of the host file system. (Default)
        #[default]
        Auto,
        Sensitive,
        Insensitive,
    }

    /// Translation of Cygwin paths.
    #[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
    pub struct Cygwin {
        #[serde(default = "default_cygdrive", skip_serializing_if = "Option::is_none")]
        pub cygdrive: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub mounts: Vec<Mount>,
    }

    impl Default for Cygwin {
        fn default() -> Self {
            Self { cygdrive: default_cygdrive(), mounts: vec![] }
        }
    }

    /// Maps a Cygwin path prefix to a host directory.
    #[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
    pub struct Mount {
        pub prefix: String,
        pub target: PathBuf,
    }

    const SUPPORTED_SCHEMA_VERSION: &str = "1.0";

    fn default_schema() -> String {
        String::from(SUPPORTED_SCHEMA_VERSION)
    }

    /// Cygwin paths are only recognized by default on Windows.
    pub(super) fn default_cygdrive() -> Option<String> {
        if cfg!(windows) { Some(String::from("/cygdrive")) } else { None }
    }

    // Custom deserialization function to validate the schema version
    fn validate_schema_version<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let schema: String = Deserialize::deserialize(deserializer)?;
        if schema != SUPPORTED_SCHEMA_VERSION {
            use serde::de::Error;
            Err(Error::custom(format!(
                "Unsupported schema version: {schema}. Expected: {SUPPORTED_SCHEMA_VERSION}"
            )))
        } else {
            Ok(schema)
        }
    }
}

pub mod validation {

    use super::types::*;
    use std::collections::HashSet;
    use thiserror::Error;

    /// Trait for validating configuration objects
    pub trait Validator<T> {
        type Error: std::error::Error;

        fn validate(config: &T) -> Result<(), Self::Error>;
    }

    /// Validation errors for configuration
    #[derive(Debug, Error)]
    pub enum ValidationError {
        #[error("Empty string value for field '{field}'")]
        EmptyString { field: String },
        #[error("Path is not absolute for field '{field}': '{path}'")]
        RelativePath { field: String, path: String },
        #[error("Duplicate {field} entry at: {idx}")]
        DuplicateEntry { field: String, idx: usize },
        #[error("Invalid prefix for field '{field}': '{prefix}' does not start with '/'")]
        InvalidPrefix { field: String, prefix: String },
        #[error("Multiple validation errors: {errors:?}")]
        Multiple { errors: Vec<ValidationError> },
    }

    /// Combinator for collecting and handling validation errors
    #[derive(Default)]
    struct ValidationCollector {
        errors: Vec<ValidationError>,
    }

    impl ValidationCollector {
        fn new() -> Self {
            Self { errors: Vec::new() }
        }

        fn add(&mut self, error: ValidationError) {
            self.errors.push(error);
        }

        fn add_result(&mut self, result: Result<(), ValidationError>) {
            if let Err(error) = result {
                match error {
                    ValidationError::Multiple { errors } => {
                        self.errors.extend(errors);
                    }
                    single_error => self.errors.push(single_error),
                }
            }
        }

        fn finish(mut self) -> Result<(), ValidationError> {
            match self.errors.len() {
                0 => Ok(()),
                1 => Err(self.errors.remove(0)),
                _ => Err(ValidationError::Multiple { errors: self.errors }),
            }
        }
    }

    impl Validator<Main> for Main {
        type Error = ValidationError;

        fn validate(config: &Main) -> Result<(), Self::Error> {
            let mut collector = ValidationCollector::new();

            collector.add_result(Workspace::validate(&config.workspace));
            collector.add_result(Cygwin::validate(&config.cygwin));

            collector.finish()
        }
    }

    impl Validator<Workspace> for Workspace {
        type Error = ValidationError;

        fn validate(config: &Workspace) -> Result<(), Self::Error> {
            let mut collector = ValidationCollector::new();

            let mut seen_names = HashSet::new();
            for (idx, project) in config.projects.iter().enumerate() {
                let field = format!("workspace.projects[{idx}]");
                if project.name.trim().is_empty() {
                    collector.add(ValidationError::EmptyString { field: format!("{field}.name") });
                } else if !seen_names.insert(&project.name) {
                    collector.add(ValidationError::DuplicateEntry { field: String::from("workspace.projects"), idx });
                }
                if !project.location.is_absolute() {
                    collector.add(ValidationError::RelativePath {
                        field: format!("{field}.location"),
                        path: project.location.display().to_string(),
                    });
                }
                collector.add_result(validate_links(&field, &project.links));
            }

            collector.finish()
        }
    }

    fn validate_links(field: &str, links: &[Link]) -> Result<(), ValidationError> {
        let mut collector = ValidationCollector::new();

        let mut seen_paths = HashSet::new();
        for (idx, link) in links.iter().enumerate() {
            let path = link.path.trim_matches('/');
            if path.is_empty() {
                collector.add(ValidationError::EmptyString { field: format!("{field}.links[{idx}].path") });
            } else if !seen_paths.insert(path) {
                collector.add(ValidationError::DuplicateEntry { field: format!("{field}.links"), idx });
            }
            if !link.target.is_absolute() {
                collector.add(ValidationError::RelativePath {
                    field: format!("{field}.links[{idx}].target"),
                    path: link.target.display().to_string(),
                });
            }
        }

        collector.finish()
    }

    impl Validator<Cygwin> for Cygwin {
        type Error = ValidationError;

        fn validate(config: &Cygwin) -> Result<(), Self::Error> {
            let mut collector = ValidationCollector::new();

            if let Some(cygdrive) = config.cygdrive.as_ref().filter(|prefix| !prefix.starts_with('/')) {
                collector.add(ValidationError::InvalidPrefix {
                    field: String::from("cygwin.cygdrive"),
                    prefix: cygdrive.clone(),
                });
            }
            for (idx, mount) in config.mounts.iter().enumerate() {
                if !mount.prefix.starts_with('/') {
                    collector.add(ValidationError::InvalidPrefix {
                        field: format!("cygwin.mounts[{idx}].prefix"),
                        prefix: mount.prefix.clone(),
                    });
                }
                if mount.target.as_os_str().is_empty() {
                    collector.add(ValidationError::EmptyString { field: format!("cygwin.mounts[{idx}].target") });
                }
            }

            collector.finish()
        }
    }

}

pub mod loader {
    use super::{Main, Validator};
    use directories::{BaseDirs, ProjectDirs};
    use log::{debug, info};
    use std::fs::OpenOptions;
    use std::path::{Path, PathBuf};
    use thiserror::Error;

    pub const CONFIG_FILE_NAME: &str = "buildmatch.yml";

    pub struct Loader {}

    impl Loader {
        /// Loads the configuration from the specified file or the default locations.
        ///
        /// If the configuration file is specified, it will be used. Otherwise, the default locations
        /// will be searched for the configuration file. If the configuration file is not found, the
        /// default configuration will be returned.
        pub fn load(context: &crate::context::Context, filename: &Option<String>) -> Result<Main, ConfigError> {
            if let Some(path) = filename {
                return Self::from_file(Path::new(path));
            }

            for location in Self::file_locations(context) {
                debug!("Checking configuration file: {}", location.display());
                if location.exists() {
                    return Self::from_file(location.as_path());
                }
            }
            debug!("Configuration file not found. Using the default configuration.");
            Ok(Main::default())
        }

        fn file_locations(context: &crate::context::Context) -> Vec<PathBuf> {
            let mut locations = vec![context.current_directory.clone()];
            if let Some(base_dirs) = BaseDirs::new() {
                locations.push(base_dirs.config_local_dir().to_path_buf());
                locations.push(base_dirs.config_dir().to_path_buf());
            }
            if let Some(proj_dirs) = ProjectDirs::from("org", "buildmatch", "buildmatch") {
                locations.push(proj_dirs.config_local_dir().to_path_buf());
                locations.push(proj_dirs.config_dir().to_path_buf());
            }
            locations.dedup();
            locations.iter().map(|p| p.join(CONFIG_FILE_NAME)).collect()
        }

        /// Loads the configuration from the specified file.
        pub fn from_file(path: &Path) -> Result<Main, ConfigError> {
            info!("Loading configuration file: {}", path.display());

            let reader = OpenOptions::new()
                .read(true)
                .open(path)
                .map_err(|source| ConfigError::FileAccess { path: path.to_path_buf(), source })?;

            let content: Main = Self::from_reader(reader)
                .map_err(|source| ConfigError::ParseError { path: path.to_path_buf(), source })?;

            Main::validate(&content)
                .map_err(|source| ConfigError::ValidationError { path: path.to_path_buf(), source })?;

            Ok(content)
        }

        /// Define the deserialization format of the config file.
        fn from_reader<R, T>(rdr: R) -> serde_yml::Result<T>
        where
            R: std::io::Read,
            T: serde::de::DeserializeOwned,
        {
            serde_yml::from_reader(rdr)
        }
    }

    /// Represents all possible configuration-related errors.
    #[derive(Debug, Error)]
    pub enum ConfigError {
        /// Error when opening or reading a configuration file.
        #[error("Failed to access configuration file '{path}': {source}")]
        FileAccess {
            path: PathBuf,
            #[source]
            source: std::io::Error,
        },
        /// Error when parsing the configuration file format.
        #[error("Failed to parse configuration from file '{path}': {source}")]
        ParseError {
            path: PathBuf,
            #[source]
            source: serde_yml::Error,
        },
        /// Error when configuration validation fails.
        #[error("Configuration validation failed in '{path}': {source}")]
        ValidationError {
            path: PathBuf,
            #[source]
            source: crate::config::validation::ValidationError,
        },
    }

}
