//! File relocation (copy or move) without ever replacing an existing file
//!
//! Copies open the destination with `create_new`, and moves go through a
//! hard link first, so an existing destination makes the operation fail
//! instead of being overwritten.

use crate::config::RelocationMode;
use crate::error::RelocationError;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::{debug, warn};

/// Buffer size for copying
const COPY_BUFFER_SIZE: usize = 256 * 1024;

/// Copy or move `source` to `dest`, creating parent directories as needed
pub fn relocate(source: &Path, dest: &Path, mode: RelocationMode) -> Result<(), RelocationError> {
    if fs::symlink_metadata(source).is_err() {
        return Err(RelocationError::SourceMissing {
            path: source.to_path_buf(),
        });
    }

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| RelocationError::CreateDir {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    match mode {
        RelocationMode::Copy => copy_no_clobber(source, dest),
        RelocationMode::Move => move_no_clobber(source, dest),
    }
}

/// Move by hard-linking and unlinking; falls back to copy + delete across devices
fn move_no_clobber(source: &Path, dest: &Path) -> Result<(), RelocationError> {
    match fs::hard_link(source, dest) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            return Err(RelocationError::DestinationExists {
                path: dest.to_path_buf(),
            });
        }
        Err(e) => {
            // Cross-device links and file systems without hard links
            debug!(?source, ?dest, error = %e, "Hard link failed, copying instead");
            copy_no_clobber(source, dest)?;
        }
    }

    fs::remove_file(source).map_err(|e| RelocationError::RemoveSource {
        path: source.to_path_buf(),
        dest: dest.to_path_buf(),
        source: e,
    })
}

/// Copy with buffered I/O into a file that must not exist yet
fn copy_no_clobber(source: &Path, dest: &Path) -> Result<(), RelocationError> {
    let write_err = |e: io::Error| RelocationError::Write {
        path: dest.to_path_buf(),
        source: e,
    };

    let src_file = File::open(source).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => RelocationError::SourceMissing {
            path: source.to_path_buf(),
        },
        _ => RelocationError::Write {
            path: source.to_path_buf(),
            source: e,
        },
    })?;

    let dest_file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(dest)
        .map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => RelocationError::DestinationExists {
                path: dest.to_path_buf(),
            },
            _ => write_err(e),
        })?;

    if let Err(e) = copy_contents(src_file, dest_file) {
        // Do not leave a truncated file behind
        if let Err(cleanup) = fs::remove_file(dest) {
            warn!(?dest, error = %cleanup, "Failed to remove partial copy");
        }
        return Err(write_err(e));
    }

    // Preserve modification time
    if let Ok(metadata) = fs::metadata(source)
        && let Ok(mtime) = metadata.modified()
    {
        if let Err(e) = filetime::set_file_mtime(dest, filetime::FileTime::from_system_time(mtime)) {
            debug!(?dest, error = %e, "Could not preserve modification time");
        }
    }

    Ok(())
}

fn copy_contents(src_file: File, dest_file: File) -> io::Result<()> {
    let mut reader = BufReader::with_capacity(COPY_BUFFER_SIZE, src_file);
    let mut writer = BufWriter::with_capacity(COPY_BUFFER_SIZE, dest_file);

    let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        writer.write_all(&buffer[..bytes_read])?;
    }

    writer.flush()
}
