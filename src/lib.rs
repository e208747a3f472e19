//! Photo Date Sorter - sorts image files into a date-based folder tree
//!
//! This library provides:
//! - Recursive image discovery with content sniffing
//! - Capture date resolution from EXIF/TIFF metadata with file system fallbacks
//! - Deterministic destination paths (year / month / day, optional renaming)
//! - Collision-safe copy and move that never overwrites
//! - A two-phase (plan, then commit) batch orchestrator with parallel workers

// Initialize i18n with locale files
rust_i18n::i18n!("locales", fallback = "en");

pub mod cli;
pub mod collision;
pub mod config;
pub mod discover;
pub mod error;
pub mod i18n;
pub mod layout;
pub mod process;
pub mod relocate;
pub mod report;
pub mod time;

pub use cli::Cli;
pub use config::{Config, ConfigError, RelocationMode, SortConfiguration};
pub use discover::{Discovery, DiscoveryReport, DiscoveryWarning};
pub use error::{Error, RelocationError, Result};
pub use i18n::{Language, init_locale};
pub use process::{ItemStatus, MediaItem, ProcessingStats, RunPhase, RunSummary, Sorter};
pub use time::{DateMode, DateResolver, DateSource, DateStrategy, ResolvedDate};
