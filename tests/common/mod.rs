//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

const TAG_DATE_TIME: u16 = 0x0132;
const TAG_EXIF_POINTER: u16 = 0x8769;
const TAG_DATE_TIME_ORIGINAL: u16 = 0x9003;
const TYPE_ASCII: u16 = 2;
const TYPE_LONG: u16 = 4;

/// Little-endian TIFF block with optional `DateTime` and `DateTimeOriginal`
fn tiff(original: Option<&str>, tiff_date: Option<&str>) -> Vec<u8> {
    let ifd0_count = usize::from(tiff_date.is_some()) + usize::from(original.is_some());
    let ifd0_len = 2 + 12 * ifd0_count + 4;
    let exif_len = if original.is_some() { 2 + 12 + 4 } else { 0 };
    let exif_offset = 8 + ifd0_len;
    let data_offset = exif_offset + exif_len;
    let tiff_date_offset = data_offset;
    let original_offset = data_offset + if tiff_date.is_some() { 20 } else { 0 };

    let mut out = Vec::new();
    out.extend_from_slice(b"II");
    out.extend_from_slice(&42u16.to_le_bytes());
    out.extend_from_slice(&8u32.to_le_bytes());

    let entry = |out: &mut Vec<u8>, tag: u16, kind: u16, count: u32, value: u32| {
        out.extend_from_slice(&tag.to_le_bytes());
        out.extend_from_slice(&kind.to_le_bytes());
        out.extend_from_slice(&count.to_le_bytes());
        out.extend_from_slice(&value.to_le_bytes());
    };

    // IFD0
    out.extend_from_slice(&(ifd0_count as u16).to_le_bytes());
    if tiff_date.is_some() {
        entry(&mut out, TAG_DATE_TIME, TYPE_ASCII, 20, tiff_date_offset as u32);
    }
    if original.is_some() {
        entry(&mut out, TAG_EXIF_POINTER, TYPE_LONG, 1, exif_offset as u32);
    }
    out.extend_from_slice(&0u32.to_le_bytes());

    // Exif IFD
    if original.is_some() {
        out.extend_from_slice(&1u16.to_le_bytes());
        entry(&mut out, TAG_DATE_TIME_ORIGINAL, TYPE_ASCII, 20, original_offset as u32);
        out.extend_from_slice(&0u32.to_le_bytes());
    }

    for date in [tiff_date, original].into_iter().flatten() {
        let mut field = [0u8; 20];
        field[..19].copy_from_slice(&date.as_bytes()[..19]);
        out.extend_from_slice(&field);
    }

    out
}

/// A minimal JPEG carrying only an EXIF APP1 segment
pub fn exif_jpeg(original: Option<&str>, tiff_date: Option<&str>) -> Vec<u8> {
    let tiff = tiff(original, tiff_date);
    let segment_len = (2 + 6 + tiff.len()) as u16;

    let mut out = vec![0xFF, 0xD8, 0xFF, 0xE1];
    out.extend_from_slice(&segment_len.to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(&tiff);
    out.extend_from_slice(&[0xFF, 0xD9]);
    out
}

/// A JPEG without any metadata
pub fn plain_jpeg() -> Vec<u8> {
    vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0x01, 0x01, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0xFF, 0xD9]
}

pub fn write_file(path: &Path, bytes: &[u8]) -> PathBuf {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, bytes).unwrap();
    path.to_path_buf()
}

/// Every file below `root`, relative, sorted
pub fn tree(root: &Path) -> Vec<PathBuf> {
    if !root.exists() {
        return Vec::new();
    }
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().strip_prefix(root).unwrap().to_path_buf())
        .collect();
    files.sort();
    files
}
