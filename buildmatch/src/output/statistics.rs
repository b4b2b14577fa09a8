// SPDX-License-Identifier: GPL-3.0-or-later

//! Statistics collection for the matching run.
//!
//! A shared `OutputStatistics` instance is updated while the build output
//! flows through the line parser, the resolver and the writer. After the
//! processing completes, the statistics are logged.

use crate::resolver::MatchResult;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct OutputStatistics {
    /// Number of lines read from the build output.
    pub lines_read: AtomicUsize,

    /// Number of lines recognized as diagnostics.
    pub diagnostics_found: AtomicUsize,

    /// Number of directory changes reported by `make`.
    pub directory_changes: AtomicUsize,

    /// Number of file references resolved to exactly one file.
    pub files_resolved: AtomicUsize,

    /// Number of file references without any matching file.
    pub files_missing: AtomicUsize,

    /// Number of file references matching more than one file.
    pub files_ambiguous: AtomicUsize,

    /// Total number of markers written to the output.
    pub markers_written: AtomicUsize,
}

impl OutputStatistics {
    /// Creates a new `OutputStatistics` instance wrapped in an `Arc` for sharing.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Count the outcome of a resolution.
    pub fn record(&self, result: &MatchResult) {
        let counter = match result {
            MatchResult::Unique(_) => &self.files_resolved,
            MatchResult::NoMatch => &self.files_missing,
            MatchResult::Ambiguous(_) => &self.files_ambiguous,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

impl fmt::Display for OutputStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines = self.lines_read.load(Ordering::Relaxed);
        let diagnostics = self.diagnostics_found.load(Ordering::Relaxed);
        let directories = self.directory_changes.load(Ordering::Relaxed);
        let resolved = self.files_resolved.load(Ordering::Relaxed);
        let missing = self.files_missing.load(Ordering::Relaxed);
        let ambiguous = self.files_ambiguous.load(Ordering::Relaxed);
        let written = self.markers_written.load(Ordering::Relaxed);

        writeln!(f, "Matching:")?;
        writeln!(f, "  lines read: {}", lines)?;
        writeln!(f, "  diagnostics: {}", diagnostics)?;
        writeln!(f, "  directory changes: {}", directories)?;
        writeln!(f, "  resolved to a file: {}", resolved)?;
        writeln!(f, "  no matching file: {}", missing)?;
        writeln!(f, "  ambiguous file: {}", ambiguous)?;
        write!(f, "  total markers written: {}", written)
    }
}
