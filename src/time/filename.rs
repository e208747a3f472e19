//! Messenger export filename dates
//!
//! Messenger apps export images as `IMG-20150709-WA0001.jpg`, discarding the
//! EXIF block. The only date left is the one in the name, and it carries no
//! time of day.

use super::{DateSource, ResolvedDate};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use tracing::trace;

/// Character that ends the date token (`W` of `WA0001`)
const MARKER: char = 'W';

/// Format of the token preceding the marker
const TOKEN_FORMAT: &str = "IMG-%Y%m%d-";

static MESSENGER_PATTERN: OnceLock<Regex> = OnceLock::new();

fn messenger_pattern() -> &'static Regex {
    MESSENGER_PATTERN.get_or_init(|| Regex::new(r"^IMG-\d{8}-WA").unwrap())
}

/// Whether a filename follows the messenger export naming scheme
pub fn is_messenger_filename(filename: &str) -> bool {
    messenger_pattern().is_match(filename)
}

/// Resolve the date encoded in a messenger export filename
///
/// The date is taken at midnight and shifted by `offset`.
pub fn resolve_messenger_date(path: &Path, offset: Duration) -> Option<ResolvedDate> {
    let filename = path.file_name()?.to_str()?;
    let timestamp = parse_messenger_filename(filename)?.checked_add_signed(offset)?;
    trace!(filename, %timestamp, "Matched messenger filename");
    Some(ResolvedDate {
        timestamp,
        source: DateSource::MessengerFilename,
    })
}

fn parse_messenger_filename(filename: &str) -> Option<NaiveDateTime> {
    let end = filename.find(MARKER)?;
    let token = &filename[..end];
    let date = NaiveDate::parse_from_str(token, TOKEN_FORMAT).ok()?;
    date.and_hms_opt(0, 0, 0)
}
