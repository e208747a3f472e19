//! End-to-end tests for the plan and commit phases
//!
//! Images carry a hand-built EXIF segment so the metadata step is exercised
//! without binary fixtures.

mod common;

use chrono::NaiveDate;
use common::{exif_jpeg, plain_jpeg, tree, write_file};
use filetime::FileTime;
use photo_date_sorter::{
    DateResolver, DateSource, Discovery, ItemStatus, RelocationMode, SortConfiguration, Sorter,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const CAPTURED: &str = "2015:07:09 18:43:04";

fn sorter(out: &Path, rename: bool) -> Sorter {
    let config = SortConfiguration::new(out, true, true, false, rename);
    Sorter::new(config).unwrap()
}

fn captured_image(dir: &Path, name: &str) -> PathBuf {
    write_file(&dir.join(name), &exif_jpeg(Some(CAPTURED), None))
}

#[test]
fn sorts_by_exif_year_and_month() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("in");
    let out = temp.path().join("out");
    captured_image(&input, "IMG_20150709_184304.jpg");

    let mut sorter = sorter(&out, false);
    let items = sorter.discover(&[input.clone()]).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].date().unwrap().source, DateSource::ExifOriginal);

    let summary = sorter.commit(RelocationMode::Move).unwrap();
    assert_eq!(summary.moved, 1);
    assert!(out.join("2015/07-July/IMG_20150709_184304.jpg").is_file());
    assert!(tree(&input).is_empty());
}

#[test]
fn renames_by_timestamp() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("in");
    let out = temp.path().join("out");
    captured_image(&input, "IMG_20150709_184304.JPG");

    let mut sorter = sorter(&out, true);
    sorter.discover(&[input]).unwrap();
    sorter.commit(RelocationMode::Copy).unwrap();

    assert_eq!(
        tree(&out),
        vec![PathBuf::from("2015/07-July/2015-07-09_18-43-04.JPG")]
    );
}

#[test]
fn exif_wins_over_file_times() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("in");
    let path = captured_image(&input, "photo.jpg");
    filetime::set_file_mtime(&path, FileTime::from_unix_time(978_307_200, 0)).unwrap();

    let mut sorter = sorter(&temp.path().join("out"), false);
    let items = sorter.discover(&[input]).unwrap();

    let expected = NaiveDate::from_ymd_opt(2015, 7, 9)
        .unwrap()
        .and_hms_opt(18, 43, 4)
        .unwrap();
    assert_eq!(items[0].date().unwrap().timestamp, expected);
}

#[test]
fn falls_back_to_tiff_date_time() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("in");
    write_file(
        &input.join("scan.jpg"),
        &exif_jpeg(None, Some("2003:12:24 08:00:00")),
    );

    let mut sorter = sorter(&temp.path().join("out"), false);
    let items = sorter.discover(&[input]).unwrap();

    let date = items[0].date().unwrap();
    assert_eq!(date.source, DateSource::TiffDateTime);
    assert!(items[0]
        .planned_destination()
        .unwrap()
        .ends_with("2003/12-December/scan.jpg"));
}

#[test]
fn falls_back_to_file_times_without_exif() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("in");
    write_file(&input.join("plain.jpg"), &plain_jpeg());

    let mut sorter = sorter(&temp.path().join("out"), false);
    let items = sorter.discover(&[input]).unwrap();

    let source = items[0].date().unwrap().source;
    assert!(matches!(source, DateSource::FileCreated | DateSource::FileModified));
    assert_eq!(items[0].status(), ItemStatus::Planned);
}

#[test]
fn existing_destination_gets_suffix() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("in");
    let out = temp.path().join("out");
    captured_image(&input, "a.jpg");
    write_file(&out.join("2015/07-July/a.jpg"), b"already here");

    let mut sorter = sorter(&out, false);
    sorter.discover(&[input]).unwrap();
    sorter.commit(RelocationMode::Move).unwrap();

    let month = out.join("2015/07-July");
    assert_eq!(fs::read(month.join("a.jpg")).unwrap(), b"already here");
    assert!(month.join("a-1.jpg").is_file());
    assert_eq!(
        sorter.items()[0].destination().unwrap(),
        month.join("a-1.jpg")
    );
}

#[test]
fn planning_touches_nothing() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("in");
    let out = temp.path().join("out");
    captured_image(&input, "a.jpg");
    captured_image(&input.join("nested"), "b.jpg");
    let before = tree(temp.path());

    let mut sorter = sorter(&out, false);
    sorter.discover(&[input]).unwrap();

    assert_eq!(sorter.summary().pending, 2);
    assert_eq!(tree(temp.path()), before);
    assert!(!out.exists());
}

#[test]
fn repeated_copy_runs_version_the_names() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("in");
    let out = temp.path().join("out");
    captured_image(&input, "a.jpg");

    let mut sorter = sorter(&out, false);
    for _ in 0..2 {
        sorter.discover(&[input.clone()]).unwrap();
        let summary = sorter.commit(RelocationMode::Copy).unwrap();
        assert_eq!(summary.copied, 1);
    }

    assert_eq!(
        tree(&out),
        vec![
            PathBuf::from("2015/07-July/a-1.jpg"),
            PathBuf::from("2015/07-July/a.jpg"),
        ]
    );
    assert!(input.join("a.jpg").is_file());
}

#[test]
fn repeated_move_run_finds_nothing() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("in");
    let out = temp.path().join("out");
    captured_image(&input, "a.jpg");

    let mut sorter = sorter(&out, false);
    sorter.discover(&[input.clone()]).unwrap();
    sorter.commit(RelocationMode::Move).unwrap();

    let items = sorter.discover(&[input]).unwrap();
    assert!(items.is_empty());
    assert_eq!(tree(&out), vec![PathBuf::from("2015/07-July/a.jpg")]);
}

#[test]
fn undated_files_stay_in_place() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("in");
    let out = temp.path().join("out");
    captured_image(&input, "a.jpg");

    let config = SortConfiguration::new(&out, true, true, false, false);
    let mut sorter =
        Sorter::with_parts(config, Discovery::new(), DateResolver::with_strategies(vec![]), 1)
            .unwrap();
    sorter.discover(&[input.clone()]).unwrap();
    let summary = sorter.commit(RelocationMode::Move).unwrap();

    assert_eq!(summary.skipped.len(), 1);
    assert!(input.join("a.jpg").is_file());
    assert!(!out.exists());
}
