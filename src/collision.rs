//! Filename collision resolution
//!
//! `a.jpg` is taken → `a-1.jpg`, `a-2.jpg`, … The check is only meaningful
//! right before the write, so callers hold the destination directory lock
//! while resolving and relocating.

use crate::error::{Error, Result};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Highest counter tried before giving up
pub const MAX_SUFFIX: u32 = 10_000;

/// Return `proposed` if free, otherwise the first free `stem-n.ext`
pub fn resolve_available_path(proposed: &Path) -> Result<PathBuf> {
    resolve_with(proposed, |candidate| fs::symlink_metadata(candidate).is_ok())
}

/// Collision resolution against an arbitrary "is taken" predicate
pub fn resolve_with(proposed: &Path, is_taken: impl Fn(&Path) -> bool) -> Result<PathBuf> {
    if !is_taken(proposed) {
        return Ok(proposed.to_path_buf());
    }

    let (stem, extension) = split_name(proposed).ok_or_else(|| Error::CollisionExhausted {
        path: proposed.to_path_buf(),
    })?;

    for n in 1..=MAX_SUFFIX {
        let candidate = proposed.with_file_name(suffixed_name(&stem, extension.as_ref(), n));
        if !is_taken(&candidate) {
            return Ok(candidate);
        }
    }

    Err(Error::CollisionExhausted {
        path: proposed.to_path_buf(),
    })
}

/// Split a file name into stem and optional extension
///
/// Dot-files like `.hidden` have no extension, so they become `.hidden-1`.
fn split_name(path: &Path) -> Option<(OsString, Option<OsString>)> {
    let stem = path.file_stem()?.to_os_string();
    let extension = path.extension().map(|e| e.to_os_string());
    Some((stem, extension))
}

fn suffixed_name(stem: &OsString, extension: Option<&OsString>, n: u32) -> OsString {
    let mut name = stem.clone();
    name.push(format!("-{}", n));
    if let Some(ext) = extension {
        name.push(".");
        name.push(ext);
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_free_path_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let proposed = dir.path().join("2015").join("a.jpg");
        assert_eq!(resolve_available_path(&proposed).unwrap(), proposed);
    }

    #[test]
    fn test_taken_path_gets_counter() {
        let dir = tempfile::tempdir().unwrap();
        let proposed = dir.path().join("a.jpg");
        fs::write(&proposed, b"x").unwrap();

        assert_eq!(
            resolve_available_path(&proposed).unwrap(),
            dir.path().join("a-1.jpg")
        );

        fs::write(dir.path().join("a-1.jpg"), b"x").unwrap();
        assert_eq!(
            resolve_available_path(&proposed).unwrap(),
            dir.path().join("a-2.jpg")
        );
    }

    #[test]
    fn test_smallest_free_counter() {
        let taken: HashSet<PathBuf> = ["/out/a.jpg", "/out/a-1.jpg", "/out/a-3.jpg"]
            .iter()
            .map(PathBuf::from)
            .collect();
        let resolved = resolve_with(Path::new("/out/a.jpg"), |p| taken.contains(p)).unwrap();
        assert_eq!(resolved, PathBuf::from("/out/a-2.jpg"));
    }

    #[test]
    fn test_names_without_extension() {
        let taken: HashSet<PathBuf> = ["/out/scan", "/out/.hidden"].iter().map(PathBuf::from).collect();
        assert_eq!(
            resolve_with(Path::new("/out/scan"), |p| taken.contains(p)).unwrap(),
            PathBuf::from("/out/scan-1")
        );
        assert_eq!(
            resolve_with(Path::new("/out/.hidden"), |p| taken.contains(p)).unwrap(),
            PathBuf::from("/out/.hidden-1")
        );
    }

    #[test]
    fn test_multiple_dots_keep_last_extension() {
        let resolved = resolve_with(Path::new("/out/a.b.jpg"), |p| p == Path::new("/out/a.b.jpg")).unwrap();
        assert_eq!(resolved, PathBuf::from("/out/a.b-1.jpg"));
    }

    #[test]
    fn test_exhausted() {
        let err = resolve_with(Path::new("/out/a.jpg"), |_| true).unwrap_err();
        assert!(matches!(err, Error::CollisionExhausted { .. }));
    }
}
