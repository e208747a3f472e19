//! Destination path synthesis
//!
//! Turns a capture time and a [`SortConfiguration`] into the path a file
//! should land at, before any collision handling. Pure: no file system access.

use crate::config::SortConfiguration;
use chrono::{Datelike, NaiveDateTime};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Format of the file name when renaming by timestamp
const RENAME_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Build the destination path for `source` captured at `timestamp`
///
/// Returns `None` when `source` has no file name.
pub fn destination_path(
    source: &Path,
    timestamp: &NaiveDateTime,
    config: &SortConfiguration,
) -> Option<PathBuf> {
    let mut dest = config.destination_root.clone();
    dest.extend(folder_segments(timestamp, config));
    dest.push(file_name(source, timestamp, config.rename_by_timestamp)?);
    Some(dest)
}

/// Directory segments below the destination root
pub fn folder_segments(timestamp: &NaiveDateTime, config: &SortConfiguration) -> Vec<String> {
    let mut segments = Vec::with_capacity(3);
    if config.by_year {
        segments.push(format!("{:04}", timestamp.year()));
    }
    if config.by_month {
        let month = timestamp.month();
        // chrono guarantees 1..=12
        let name = config.month_language.month_name(month).unwrap_or_default();
        segments.push(format!("{:02}-{}", month, name));
    }
    if config.by_day {
        segments.push(format!("{:02}", timestamp.day()));
    }
    segments
}

fn file_name(source: &Path, timestamp: &NaiveDateTime, rename: bool) -> Option<OsString> {
    let original = source.file_name()?;
    if !rename {
        return Some(original.to_os_string());
    }

    let mut name = OsString::from(timestamp.format(RENAME_FORMAT).to_string());
    if let Some(ext) = source.extension() {
        name.push(".");
        name.push(ext);
    }
    Some(name)
}
