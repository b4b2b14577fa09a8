// SPDX-License-Identifier: GPL-3.0-or-later

//! This module recognizes the interesting lines of a build output.
//!
//! Two kinds of lines are relevant. Diagnostics from compilers and other
//! tools, which follow the `file:line[:column]: [severity:] message` form.
//! And the directory changes which `make` reports when it runs recursively,
//! these tell what the relative file names are relative to.

mod directory;

pub use directory::DirectoryStack;

use crate::markers::Severity;
use regex_lite::Regex;
use std::sync::LazyLock;

/// The file reference with an optional drive letter, then line and column numbers.
static DIAGNOSTIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<file>(?:[A-Za-z]:)?[^:]+):(?P<line>\d+)(?::(?P<column>\d+))?:\s*(?:(?P<severity>fatal error|error|warning|note|info)\s*:\s*)?(?P<message>.*)$",
    )
    .expect("Invalid diagnostic regex pattern")
});

static MAKE_DIRECTORY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(?:\S*[/\\-])?[gm]?make(?:\.exe)?(?:\[\d+\])?: (?P<action>Entering|Leaving) directory [`'"](?P<directory>.*)['"]\s*$"#)
        .expect("Invalid make directory regex pattern")
});

/// A diagnostic which refers to a file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorLine {
    /// The file reference as it was printed.
    pub fragment: String,
    pub line: u32,
    pub column: Option<u32>,
    pub severity: Severity,
    pub description: String,
}

/// The recognized form of a build output line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputLine {
    Error(ErrorLine),
    EnterDirectory(String),
    LeaveDirectory(String),
    Other,
}

impl OutputLine {
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);

        if let Some(captures) = MAKE_DIRECTORY.captures(line) {
            let directory = captures["directory"].to_string();
            return match &captures["action"] {
                "Entering" => OutputLine::EnterDirectory(directory),
                _ => OutputLine::LeaveDirectory(directory),
            };
        }

        DIAGNOSTIC.captures(line).and_then(|captures| {
            let fragment = captures["file"].trim();
            let description = captures["message"].trim();
            if fragment.is_empty() || description.is_empty() {
                return None;
            }
            let error = ErrorLine {
                fragment: fragment.to_string(),
                line: captures["line"].parse().ok()?,
                column: captures.name("column").and_then(|column| column.as_str().parse().ok()),
                severity: captures
                    .name("severity")
                    .map(|severity| Severity::from_keyword(severity.as_str()))
                    .unwrap_or_default(),
                description: description.to_string(),
            };
            Some(OutputLine::Error(error))
        })
        .unwrap_or(OutputLine::Other)
    }
}
