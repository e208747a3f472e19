//! Time extraction module
//!
//! Resolves the capture time of an image by trying an ordered list of
//! strategies:
//! - EXIF `DateTimeOriginal`, then TIFF `DateTime`
//! - File system creation time
//! - File system modification time
//!
//! Messenger export filenames are a separate, explicitly selected mode.

pub mod exif;
pub mod filename;
pub mod filesystem;

use crate::config::DEFAULT_MESSENGER_OFFSET_HOURS;
use chrono::{Duration, NaiveDateTime};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

pub use filename::is_messenger_filename;

/// Source of the resolved timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateSource {
    /// EXIF `DateTimeOriginal`
    ExifOriginal,
    /// TIFF `DateTime`
    TiffDateTime,
    /// File system creation time
    FileCreated,
    /// File system modification time
    FileModified,
    /// Parsed from a messenger export filename
    MessengerFilename,
}

impl fmt::Display for DateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DateSource::ExifOriginal => "exif",
            DateSource::TiffDateTime => "tiff",
            DateSource::FileCreated => "created",
            DateSource::FileModified => "modified",
            DateSource::MessengerFilename => "filename",
        };
        f.write_str(name)
    }
}

/// A resolved timestamp and where it came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedDate {
    pub timestamp: NaiveDateTime,
    pub source: DateSource,
}

/// How the date of a single item is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateMode {
    /// Metadata, then file system times
    #[default]
    DefaultChain,
    /// Date in a messenger export filename
    MessengerFilename,
}

/// One step of the fallback chain
pub trait DateStrategy: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Resolve a date, or `None` to hand over to the next strategy
    fn resolve(&self, path: &Path) -> Option<ResolvedDate>;
}

/// Ordered list of date strategies; the first hit wins
pub struct DateResolver {
    strategies: Vec<Box<dyn DateStrategy>>,
    messenger_offset: Duration,
}

impl Default for DateResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DateResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.strategies.iter().map(|s| s.name()).collect();
        f.debug_struct("DateResolver")
            .field("strategies", &names)
            .field("messenger_offset", &self.messenger_offset)
            .finish()
    }
}

impl DateResolver {
    /// The standard chain: EXIF, creation time, modification time
    pub fn new() -> Self {
        Self::with_strategies(vec![
            Box::new(exif::ExifDate),
            Box::new(filesystem::CreatedDate),
            Box::new(filesystem::ModifiedDate),
        ])
    }

    /// A resolver with a custom chain
    pub fn with_strategies(strategies: Vec<Box<dyn DateStrategy>>) -> Self {
        Self {
            strategies,
            messenger_offset: Duration::hours(DEFAULT_MESSENGER_OFFSET_HOURS),
        }
    }

    /// Change the offset applied to messenger filename dates
    pub fn with_messenger_offset(mut self, offset: Duration) -> Self {
        self.messenger_offset = offset;
        self
    }

    /// Resolve a date using the given mode
    pub fn resolve_with(&self, path: &Path, mode: DateMode) -> Option<ResolvedDate> {
        match mode {
            DateMode::DefaultChain => self.resolve(path),
            DateMode::MessengerFilename => self.resolve_messenger(path),
        }
    }

    /// Walk the fallback chain
    pub fn resolve(&self, path: &Path) -> Option<ResolvedDate> {
        for strategy in &self.strategies {
            if let Some(resolved) = strategy.resolve(path) {
                debug!(?path, strategy = strategy.name(), timestamp = %resolved.timestamp, "Resolved date");
                return Some(resolved);
            }
        }
        warn!(?path, "No date could be resolved");
        None
    }

    /// Resolve the date from a messenger export filename
    pub fn resolve_messenger(&self, path: &Path) -> Option<ResolvedDate> {
        let resolved = filename::resolve_messenger_date(path, self.messenger_offset);
        if resolved.is_none() {
            warn!(?path, "Filename does not carry a messenger date");
        }
        resolved
    }
}
