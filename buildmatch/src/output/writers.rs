// SPDX-License-Identifier: GPL-3.0-or-later

use super::json;
use super::{OutputStatistics, WriterError};
use crate::markers::ProblemMarker;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::{io, path};
use tempfile::TempPath;

/// The markers as they come from the build output, which might fail to read.
pub(super) type MarkerResult = io::Result<ProblemMarker>;

/// A trait representing a writer for iterator type `T`.
///
/// This trait is implemented by types that can consume an iterator of type `T`
/// and write its elements to some output.
pub(super) trait IteratorWriter<T> {
    /// Consumes the iterator and returns either nothing on success or an error.
    fn write(self, items: impl Iterator<Item = T>) -> Result<(), WriterError>;
}

/// Writes the markers as a JSON array into the given stream.
pub(super) struct MarkerOutputWriter<W: io::Write> {
    output: W,
    name: path::PathBuf,
}

impl<W: io::Write> MarkerOutputWriter<W> {
    pub(super) fn new(output: W, name: &path::Path) -> Self {
        Self { output, name: name.to_path_buf() }
    }
}

impl MarkerOutputWriter<io::Stdout> {
    pub(super) fn stdout() -> Self {
        Self::new(io::stdout(), path::Path::new("<stdout>"))
    }
}

impl<W: io::Write> IteratorWriter<MarkerResult> for MarkerOutputWriter<W> {
    fn write(mut self, markers: impl Iterator<Item = MarkerResult>) -> Result<(), WriterError> {
        json::serialize_result_seq(&mut self.output, markers.map(|marker| marker.map_err(WriterError::Input)))?;

        writeln!(self.output)
            .and_then(|_| self.output.flush())
            .map_err(|err| WriterError::Io(self.name, err))
    }
}

/// Writes the output into a temporary file, and moves it to the final name
/// only when the writing was successful. The temporary file is removed in
/// case of errors, the previous output stays untouched.
pub(super) struct AtomicOutputWriter<T: IteratorWriter<MarkerResult>> {
    writer: T,
    temp_path: TempPath,
    final_path: path::PathBuf,
}

impl<T: IteratorWriter<MarkerResult>> AtomicOutputWriter<T> {
    pub(super) fn new(writer: T, temp_path: TempPath, final_path: &path::Path) -> Self {
        Self { writer, temp_path, final_path: final_path.to_path_buf() }
    }
}

impl<T: IteratorWriter<MarkerResult>> IteratorWriter<MarkerResult> for AtomicOutputWriter<T> {
    fn write(self, markers: impl Iterator<Item = MarkerResult>) -> Result<(), WriterError> {
        if let Err(error) = self.writer.write(markers) {
            log::debug!("Removing the temporary output {}", self.temp_path.display());
            return Err(error);
        }

        self.temp_path.persist(&self.final_path).map_err(|err| WriterError::Io(self.final_path, err.error))
    }
}

/// Counts the markers passing through.
pub(super) struct CountingOutputWriter<T: IteratorWriter<MarkerResult>> {
    writer: T,
    stats: Arc<OutputStatistics>,
}

impl<T: IteratorWriter<MarkerResult>> CountingOutputWriter<T> {
    pub(super) fn new(writer: T, stats: Arc<OutputStatistics>) -> Self {
        Self { writer, stats }
    }
}

impl<T: IteratorWriter<MarkerResult>> IteratorWriter<MarkerResult> for CountingOutputWriter<T> {
    fn write(self, markers: impl Iterator<Item = MarkerResult>) -> Result<(), WriterError> {
        let stats = self.stats;
        let counted = markers.inspect(move |marker| {
            if marker.is_ok() {
                stats.markers_written.fetch_add(1, Ordering::Relaxed);
            }
        });
        self.writer.write(counted)
    }
}
