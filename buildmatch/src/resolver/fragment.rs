// SPDX-License-Identifier: GPL-3.0-or-later

use std::fmt;
use std::path::PathBuf;

/// A file reference as it was printed by the build tool.
///
/// Both `/` and `\` are accepted as separators, since tools running on
/// Windows (or under Cygwin) mix them freely.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathFragment {
    text: String,
}

impl PathFragment {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into().trim().to_string() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// All non-empty segments, including `.` and `..`.
    pub fn segments(&self) -> Vec<&str> {
        self.text.split(['/', '\\']).filter(|segment| !segment.is_empty()).collect()
    }

    /// The segments used for the name based search.
    ///
    /// Leading `.`, `..` and drive (`C:`) segments are dropped, they can't
    /// be matched against the trailing part of a resource path.
    pub fn trailing_segments(&self) -> Vec<&str> {
        let segments = self.segments();
        let start = segments
            .iter()
            .position(|segment| !matches!(*segment, "." | "..") && !is_drive(segment))
            .unwrap_or(segments.len());
        segments[start..].iter().copied().filter(|segment| *segment != ".").collect()
    }

    /// The fragment is a file name without any directory component.
    pub fn is_bare(&self) -> bool {
        self.segments().len() == 1
    }

    /// The fragment as a native path.
    pub fn to_path(&self) -> PathBuf {
        PathBuf::from(&self.text)
    }
}

impl fmt::Display for PathFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

fn is_drive(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    bytes.len() == 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}
