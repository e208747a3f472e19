//! EXIF time extraction for images

use super::{DateSource, DateStrategy, ResolvedDate};
use crate::error::{Error, Result};
use chrono::NaiveDateTime;
use exif::{In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, trace};

/// Format of EXIF/TIFF date fields, e.g. `2015:07:09 18:43:04`
const EXIF_DATE_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Date tags to try, in priority order
const DATE_TAGS: &[(Tag, DateSource)] = &[
    (Tag::DateTimeOriginal, DateSource::ExifOriginal), // When the original image was taken
    (Tag::DateTime, DateSource::TiffDateTime),         // TIFF file date/time
];

/// Embedded capture date strategy
#[derive(Debug, Default, Clone, Copy)]
pub struct ExifDate;

impl DateStrategy for ExifDate {
    fn name(&self) -> &'static str {
        "exif"
    }

    fn resolve(&self, path: &Path) -> Option<ResolvedDate> {
        match extract_exif_time(path) {
            Ok((timestamp, source)) => Some(ResolvedDate { timestamp, source }),
            Err(e) => {
                debug!(?path, error = %e, "No usable EXIF date");
                None
            }
        }
    }
}

/// Extract the capture time from EXIF metadata
pub fn extract_exif_time(path: &Path) -> Result<(NaiveDateTime, DateSource)> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let exif = Reader::new()
        .read_from_container(&mut reader)
        .map_err(|e| Error::ExifRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    for (tag, source) in DATE_TAGS {
        let Some(field) = exif.get_field(*tag, In::PRIMARY) else {
            continue;
        };
        if let Value::Ascii(ref values) = field.value
            && let Some(raw) = values.first()
            && let Some(datetime) = parse_exif_datetime(raw)
        {
            trace!(?path, ?tag, "Found EXIF date");
            return Ok((datetime, *source));
        }
    }

    Err(Error::ExifRead {
        path: path.to_path_buf(),
        message: "No valid date tag found in EXIF data".to_string(),
    })
}

/// Parse a raw EXIF date field
///
/// chrono's numeric parser does not depend on the process locale, so the
/// result is the same on every machine. Fields padded with NULs or spaces
/// are accepted; blanked-out dates (`0000:00:00 00:00:00`) are not.
pub fn parse_exif_datetime(raw: &[u8]) -> Option<NaiveDateTime> {
    let s = std::str::from_utf8(raw).ok()?;
    let s = s.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    NaiveDateTime::parse_from_str(s, EXIF_DATE_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_exif_datetime() {
        let dt = parse_exif_datetime(b"2015:07:09 18:43:04").unwrap();
        assert_eq!(dt.year(), 2015);
        assert_eq!(dt.month(), 7);
        assert_eq!(dt.day(), 9);
        assert_eq!(dt.hour(), 18);
        assert_eq!(dt.minute(), 43);
        assert_eq!(dt.second(), 4);

        // NUL terminated, as stored in the file
        let dt = parse_exif_datetime(b"2015:07:09 18:43:04\0").unwrap();
        assert_eq!(dt.year(), 2015);
    }

    #[test]
    fn test_parse_exif_datetime_rejects_other_formats() {
        assert!(parse_exif_datetime(b"2015-07-09 18:43:04").is_none());
        assert!(parse_exif_datetime(b"0000:00:00 00:00:00").is_none());
        assert!(parse_exif_datetime(b"    :  :     :  :  ").is_none());
        assert!(parse_exif_datetime(b"invalid").is_none());
        assert!(parse_exif_datetime(&[0xff, 0xfe]).is_none());
    }

    #[test]
    fn test_non_image_has_no_exif() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();

        assert!(extract_exif_time(&path).is_err());
        assert!(ExifDate.resolve(&path).is_none());
    }
}
