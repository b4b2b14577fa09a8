// SPDX-License-Identifier: GPL-3.0-or-later

//! Translation of Cygwin style paths to host paths.
//!
//! Cygwin based toolchains print paths like `/cygdrive/c/work/main.c` or
//! `/usr/include/stdio.h`. The first form maps a drive letter, the second
//! one depends on the mount table of the Cygwin installation. Both are
//! configured explicitly, this module does not query the Cygwin tools.

use crate::config;
use std::path::PathBuf;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CygwinMapping {
    cygdrive: Option<String>,
    mounts: Vec<(String, PathBuf)>,
}

impl CygwinMapping {
    pub fn new(cygdrive: Option<&str>, mounts: impl IntoIterator<Item = (String, PathBuf)>) -> Self {
        let mut mounts: Vec<(String, PathBuf)> = mounts
            .into_iter()
            .map(|(prefix, target)| (trim_prefix(&prefix), target))
            .collect();
        // longest prefix first, so nested mounts take precedence
        mounts.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()));

        Self { cygdrive: cygdrive.map(trim_prefix), mounts }
    }

    /// Tells whether the text looks like one of the configured Cygwin conventions.
    pub fn is_cygwin_path(&self, text: &str) -> bool {
        self.drive(text).is_some() || self.mount(text).is_some()
    }

    /// Translate the text into a host path.
    ///
    /// Returns `None` when the text does not follow any configured convention.
    pub fn translate(&self, text: &str) -> Option<PathBuf> {
        if let Some((letter, rest)) = self.drive(text) {
            let mut result = format!("{}:/", letter.to_ascii_uppercase());
            result.push_str(rest);
            return Some(PathBuf::from(result));
        }
        if let Some((target, rest)) = self.mount(text) {
            let rest: PathBuf = rest.split('/').filter(|s| !s.is_empty()).collect();
            return Some(target.join(rest));
        }
        None
    }

    fn drive<'t>(&self, text: &'t str) -> Option<(char, &'t str)> {
        let prefix = self.cygdrive.as_deref()?;
        let rest = text.strip_prefix(prefix)?.strip_prefix('/')?;
        let mut chars = rest.chars();
        let letter = chars.next().filter(char::is_ascii_alphabetic)?;
        let rest = chars.as_str();
        if rest.is_empty() {
            Some((letter, rest))
        } else {
            rest.strip_prefix('/').map(|rest| (letter, rest))
        }
    }

    fn mount<'t>(&self, text: &'t str) -> Option<(&PathBuf, &'t str)> {
        self.mounts.iter().find_map(|(prefix, target)| {
            let rest = text.strip_prefix(prefix.as_str())?;
            if rest.is_empty() || rest.starts_with('/') {
                Some((target, rest))
            } else {
                None
            }
        })
    }
}

impl From<&config::Cygwin> for CygwinMapping {
    fn from(value: &config::Cygwin) -> Self {
        let mounts = value.mounts.iter().map(|mount| (mount.prefix.clone(), mount.target.clone()));
        CygwinMapping::new(value.cygdrive.as_deref(), mounts)
    }
}

fn trim_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_end_matches('/');
    if trimmed.is_empty() { String::from("/") } else { trimmed.to_string() }
}
