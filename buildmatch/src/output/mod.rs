// SPDX-License-Identifier: GPL-3.0-or-later

//! This module is responsible for writing the problem markers.
//!
//! The markers are written as a JSON array, either to the standard output
//! or to a file. The file is replaced atomically, a failed run does not
//! leave a half written output behind.

mod json;
mod statistics;
mod writers;

use crate::args;
use crate::markers::ProblemMarker;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::{fs, io};
use thiserror::Error;
use writers::{AtomicOutputWriter, CountingOutputWriter, IteratorWriter, MarkerOutputWriter};

pub use statistics::OutputStatistics;

/// A stack of writers for the file output.
type FileWriterStack = CountingOutputWriter<AtomicOutputWriter<MarkerOutputWriter<io::BufWriter<fs::File>>>>;
type StdoutWriterStack = CountingOutputWriter<MarkerOutputWriter<io::Stdout>>;

enum Destination {
    File(FileWriterStack),
    Stdout(StdoutWriterStack),
}

/// Represents the output writer for problem markers.
pub struct OutputWriter {
    destination: Destination,
    stats: Arc<OutputStatistics>,
}

impl OutputWriter {
    pub fn create(output: &args::Diagnostics, stats: Arc<OutputStatistics>) -> Result<Self, WriterCreationError> {
        let destination = if output.is_stdout() {
            Destination::Stdout(CountingOutputWriter::new(MarkerOutputWriter::stdout(), Arc::clone(&stats)))
        } else {
            let final_path = PathBuf::from(&output.file_name);
            let (file, temp_path) = Self::temporary_file(&final_path)
                .map_err(|err| WriterCreationError::Io(final_path.clone(), err))?
                .into_parts();
            log::debug!("Writing the output into {}", temp_path.display());

            let base_writer = MarkerOutputWriter::new(io::BufWriter::new(file), &temp_path);
            let atomic_writer = AtomicOutputWriter::new(base_writer, temp_path, &final_path);
            Destination::File(CountingOutputWriter::new(atomic_writer, Arc::clone(&stats)))
        };
        Ok(Self { destination, stats })
    }

    /// Creates a uniquely named file next to the output, so it never
    /// collides with an existing file (the build output included).
    fn temporary_file(final_path: &Path) -> io::Result<tempfile::NamedTempFile> {
        let directory = match final_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut builder = tempfile::Builder::new();
        builder.prefix(".buildmatch-").suffix(".tmp");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(fs::Permissions::from_mode(0o644));
        }
        builder.tempfile_in(directory)
    }

    /// Writes the markers, and logs the statistics of the run.
    ///
    /// An error of the markers stops the writing, and the output file is
    /// left as it was before the run.
    pub fn write(self, markers: impl Iterator<Item = io::Result<ProblemMarker>>) -> Result<(), WriterError> {
        let result = match self.destination {
            Destination::File(writer) => writer.write(markers),
            Destination::Stdout(writer) => writer.write(markers),
        };

        log::info!("{}", self.stats);

        result
    }
}

/// Represents errors that can occur while creating an output writer.
#[derive(Error, Debug)]
pub enum WriterCreationError {
    #[error("Failed to create the output writer {0}: {1}")]
    Io(PathBuf, io::Error),
}

/// Represents errors that can occur while writing output.
#[derive(Error, Debug)]
pub enum WriterError {
    #[error("Failed to read the build output: {0}")]
    Input(io::Error),
    #[error("Failed to serialize the markers: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Failed to write the output {0}: {1}")]
    Io(PathBuf, io::Error),
}
