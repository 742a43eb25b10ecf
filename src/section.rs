//! Section location within snapshot files.
//!
//! A snapshot file is a flat list of lines. A section starts at a bracketed key
//! path and runs until the next blank line:
//!
//! ```text
//! WINE REGISTRY Version 2
//! #arch=win64
//!
//! [Software\\Wine\\Explorer] 1700000000     <- header, matched by prefix
//! #time=1da1b6c3a8e4f20                     <- comment, never returned
//! "Desktop"="Default"                       <- section line
//!                                           <- blank line ends the section
//! ```
//!
//! Only the first header matching a key path is ever considered; later
//! sections with the same path are invisible to every query.

use crate::error::{RegistryError, Result};
use crate::utils::decode_file_text;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::Path;
use tracing::{debug, instrument};

/// Reads a whole snapshot file as text.
///
/// The file is opened, read and closed within this call. Nothing is kept
/// between queries, so every query sees the file as it is on disk right now.
pub fn read_file_text(path: &Path) -> Result<String> {
    let data = fs::read(path).map_err(|e| RegistryError::io(path, e))?;
    debug!(size = data.len(), "Read registry file");
    Ok(decode_file_text(&data).into_owned())
}

/// Returns true if a line closes the current section.
///
/// Only an empty line counts; `lines()` has already dropped any `\r`.
fn is_blank(line: &str) -> bool {
    line.is_empty()
}

/// Returns true if a line is a comment or meta attribute.
fn is_comment(line: &str) -> bool {
    line.starts_with('#')
}

/// Finds the first line starting with `key_path`.
pub fn find_header<'a>(text: &'a str, key_path: &str) -> Option<&'a str> {
    text.lines().find(|line| line.starts_with(key_path))
}

/// Returns the lines belonging to the first section matching `key_path`.
///
/// The header line itself and `#` comment lines are not included. An unknown
/// key path yields an empty list.
pub fn section_lines<'a>(text: &'a str, key_path: &str) -> Vec<&'a str> {
    let mut lines = text.lines();

    if !lines.by_ref().any(|line| line.starts_with(key_path)) {
        return Vec::new();
    }

    lines
        .take_while(|line| !is_blank(line))
        .filter(|line| !is_comment(line))
        .collect()
}

/// Locates a section in a snapshot file and returns its raw lines.
///
/// # Arguments
///
/// * `path` - Snapshot file to scan
/// * `key_path` - Literal line prefix, e.g. `[Software\\Wine\\Drivers]`
///
/// # Errors
///
/// Returns [`RegistryError::Io`] if the file cannot be read. A key path that is
/// not present is not an error and yields an empty list.
#[instrument(skip(path), fields(path = %path.display()))]
pub fn locate_section(path: &Path, key_path: &str) -> Result<Vec<String>> {
    let text = read_file_text(path)?;
    let lines = section_lines(&text, key_path);

    if lines.is_empty() {
        debug!("Section empty or not present");
    } else {
        debug!(lines = lines.len(), "Section located");
    }

    Ok(lines.into_iter().map(str::to_string).collect())
}

/// Extracts the bracketed key path from a header line.
///
/// `[Software\\Wine] 1700000000` yields `[Software\\Wine]`. Lines that do not
/// look like headers yield `None`.
pub fn header_key(line: &str) -> Option<&str> {
    if !line.starts_with('[') {
        return None;
    }
    let end = line.rfind(']')?;
    Some(&line[..=end])
}

/// Lists every key path whose header starts with `prefix`, in file order.
///
/// Each key path is reported once even if its header appears more than once.
pub fn keys_with_prefix(text: &str, prefix: &str) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();

    for key in text
        .lines()
        .filter(|line| line.starts_with(prefix))
        .filter_map(header_key)
    {
        if !keys.iter().any(|k| k == key) {
            keys.push(key.to_string());
        }
    }

    keys
}

/// Parses the modification timestamp written after a header's closing bracket.
///
/// Headers carry the time as Unix seconds: `[Software\\Wine] 1700000000`.
pub fn header_timestamp(line: &str) -> Option<DateTime<Utc>> {
    let key = header_key(line)?;
    let secs = line[key.len()..].split_whitespace().next()?.parse::<i64>().ok()?;
    DateTime::<Utc>::from_timestamp(secs, 0)
}
