//! Recursive discovery of image files
//!
//! Expands the user-supplied roots into a flat, deduplicated list of image
//! files. Unreadable directories and symlink cycles are reported as warnings
//! and otherwise ignored.

use file_format::{FileFormat, Kind};
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{Level, debug, info, span, warn};
use walkdir::WalkDir;

/// A recoverable problem met while walking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryWarning {
    pub path: PathBuf,
    pub message: String,
}

/// Outcome of a discovery pass
#[derive(Debug, Default)]
pub struct DiscoveryReport {
    /// Absolute paths of image files, in traversal order
    pub files: Vec<PathBuf>,
    /// Subtrees that were skipped
    pub warnings: Vec<DiscoveryWarning>,
}

/// Walks roots and keeps the files that sniff as images
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    exclude_dirs: Vec<PathBuf>,
}

impl Discovery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip directories by absolute path or by folder name
    pub fn with_exclude_dirs(mut self, exclude_dirs: Vec<PathBuf>) -> Self {
        self.exclude_dirs = exclude_dirs;
        self
    }

    /// Discover image files below `roots`
    pub fn discover(&self, roots: &[PathBuf]) -> DiscoveryReport {
        let _span = span!(Level::INFO, "discover", roots = roots.len()).entered();

        let mut report = DiscoveryReport::default();
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();

        for root in roots {
            if fs::symlink_metadata(root).is_err() {
                warn!(?root, "Input path does not exist, skipping");
                report.warnings.push(DiscoveryWarning {
                    path: root.clone(),
                    message: "path does not exist".to_string(),
                });
                continue;
            }

            for entry in WalkDir::new(root)
                .follow_links(true)
                .into_iter()
                .filter_entry(|e| !(e.depth() > 0 && e.file_type().is_dir() && self.is_excluded_dir(e.path())))
            {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.clone());
                        let message = if e.loop_ancestor().is_some() {
                            "symbolic link cycle".to_string()
                        } else {
                            e.to_string()
                        };
                        warn!(?path, %message, "Skipping unreadable entry");
                        report.warnings.push(DiscoveryWarning { path, message });
                        continue;
                    }
                };

                if !entry.file_type().is_file() {
                    continue;
                }

                let path = match fs::canonicalize(entry.path()) {
                    Ok(path) => path,
                    Err(e) => {
                        debug!(path = ?entry.path(), error = %e, "Cannot resolve path");
                        continue;
                    }
                };

                if seen.insert(path.clone()) {
                    candidates.push(path);
                }
            }
        }

        // Sniffing reads file headers; do it in parallel, keeping walk order
        report.files = candidates.into_par_iter().filter(|p| is_image(p)).collect();

        info!(
            images = report.files.len(),
            warnings = report.warnings.len(),
            "Discovery finished"
        );
        report
    }

    /// Check if a path should be excluded based on exclude_dirs configuration
    fn is_excluded_dir(&self, path: &Path) -> bool {
        self.exclude_dirs.iter().any(|exclude| {
            let excluded = if exclude.is_absolute() {
                path.starts_with(exclude)
            } else {
                exclude.file_name().is_some_and(|name| path.file_name() == Some(name))
            };
            if excluded {
                debug!(?path, ?exclude, "Excluding directory");
            }
            excluded
        })
    }
}

/// Classify a file as an image by its content
///
/// Only unrecognised binary content falls back to the extension, which keeps
/// camera RAW variants without a known signature.
pub fn is_image(path: &Path) -> bool {
    match FileFormat::from_file(path) {
        Ok(FileFormat::ArbitraryBinaryData) => extension_is_image(path),
        Ok(FileFormat::Empty) => false,
        Ok(format) => format.kind() == Kind::Image,
        Err(e) => {
            debug!(?path, error = %e, "Cannot sniff file");
            false
        }
    }
}

fn extension_is_image(path: &Path) -> bool {
    mime_guess::from_path(path)
        .first()
        .is_some_and(|mime| mime.type_() == mime_guess::mime::IMAGE)
}
