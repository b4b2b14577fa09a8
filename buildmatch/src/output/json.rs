// SPDX-License-Identifier: GPL-3.0-or-later

//! Serialize entries from an iterator into a JSON array.
//!
//! The entries are written as they come, the whole sequence is never kept
//! in memory. The format is a pretty printed JSON array of objects, *not*
//! JSON lines.

use serde::Serializer;
use serde::ser::{Serialize, SerializeSeq};
use std::io;

/// Serialize entries from an iterator of results into a JSON array.
///
/// The first error of the iterator stops the writing and is returned, the
/// array is left unterminated in the output.
pub fn serialize_result_seq<W, T, E>(writer: W, entries: impl Iterator<Item = Result<T, E>>) -> Result<(), E>
where
    W: io::Write,
    T: Serialize,
    E: std::error::Error + From<serde_json::Error>,
{
    let mut ser = serde_json::Serializer::pretty(writer);
    let mut seq = ser.serialize_seq(None)?;
    for entry in entries {
        match entry {
            Ok(object) => seq.serialize_element(&object)?,
            Err(err) => return Err(err),
        }
    }
    seq.end()?;

    Ok(())
}
