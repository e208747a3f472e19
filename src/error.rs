//! Error types for the photo sorter

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for photo sorter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the photo sorter
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read EXIF data from {path}: {message}")]
    ExifRead { path: PathBuf, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Destination root must not be empty")]
    EmptyDestinationRoot,

    #[error("Cannot {action} while the run is {phase}")]
    InvalidPhase {
        action: &'static str,
        phase: crate::process::RunPhase,
    },

    #[error("Not part of the current run: {path}")]
    UnknownItem { path: PathBuf },

    #[error("No free file name left for {path}")]
    CollisionExhausted { path: PathBuf },

    #[error("Destination kept appearing during write: {path} ({attempts} attempts)")]
    DestinationContested { path: PathBuf, attempts: usize },

    #[error(transparent)]
    Relocation(#[from] RelocationError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure of a single move or copy
///
/// Always recovered per item: the orchestrator records it on the item and
/// continues with the rest of the batch.
#[derive(Error, Debug)]
pub enum RelocationError {
    #[error("Source file vanished: {path}")]
    SourceMissing { path: PathBuf },

    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Destination already exists: {path}")]
    DestinationExists { path: PathBuf },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Copied to {dest} but could not remove source {path}: {source}")]
    RemoveSource {
        path: PathBuf,
        dest: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
