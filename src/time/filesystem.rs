//! File system timestamp strategies

use super::{DateSource, DateStrategy, ResolvedDate};
use chrono::{DateTime, Local, NaiveDateTime};
use std::fs;
use std::path::Path;
use std::time::SystemTime;
use tracing::debug;

/// File creation (birth) time
#[derive(Debug, Default, Clone, Copy)]
pub struct CreatedDate;

/// Last modification time
#[derive(Debug, Default, Clone, Copy)]
pub struct ModifiedDate;

impl DateStrategy for CreatedDate {
    fn name(&self) -> &'static str {
        "file-created"
    }

    fn resolve(&self, path: &Path) -> Option<ResolvedDate> {
        // Not every platform or file system records a birth time
        let created = fs::metadata(path)
            .and_then(|m| m.created())
            .map_err(|e| debug!(?path, error = %e, "Creation time unavailable"))
            .ok()?;
        Some(ResolvedDate {
            timestamp: to_local(created),
            source: DateSource::FileCreated,
        })
    }
}

impl DateStrategy for ModifiedDate {
    fn name(&self) -> &'static str {
        "file-modified"
    }

    fn resolve(&self, path: &Path) -> Option<ResolvedDate> {
        let modified = fs::metadata(path)
            .and_then(|m| m.modified())
            .map_err(|e| debug!(?path, error = %e, "Modification time unavailable"))
            .ok()?;
        Some(ResolvedDate {
            timestamp: to_local(modified),
            source: DateSource::FileModified,
        })
    }
}

/// Convert to local wall-clock time, matching how cameras record EXIF dates
fn to_local(time: SystemTime) -> NaiveDateTime {
    DateTime::<Local>::from(time).naive_local()
}
