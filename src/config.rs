//! Configuration types for the photo sorter

use crate::error::{Error, Result};
use crate::i18n::Language;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default offset added to dates taken from messenger export filenames
pub const DEFAULT_MESSENGER_OFFSET_HOURS: i64 = 12;

/// File operation performed when a plan is committed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RelocationMode {
    /// Copy files to the destination, keep originals
    #[default]
    Copy,
    /// Move files to the destination
    Move,
}

/// Layout of the destination tree for one run
///
/// Built once by the caller and only ever borrowed by the sorting engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortConfiguration {
    /// Nest files under a `yyyy` folder
    pub by_year: bool,
    /// Nest files under a `MM-MonthName` folder
    pub by_month: bool,
    /// Nest files under a `dd` folder
    pub by_day: bool,
    /// Replace the file name with `yyyy-MM-dd_HH-mm-ss`
    pub rename_by_timestamp: bool,
    /// Root of the destination tree
    pub destination_root: PathBuf,
    /// Language of the month folder name
    #[serde(default)]
    pub month_language: Language,
}

impl SortConfiguration {
    /// Create a configuration with English month names
    pub fn new(
        destination_root: impl Into<PathBuf>,
        by_year: bool,
        by_month: bool,
        by_day: bool,
        rename_by_timestamp: bool,
    ) -> Self {
        Self {
            by_year,
            by_month,
            by_day,
            rename_by_timestamp,
            destination_root: destination_root.into(),
            month_language: Language::English,
        }
    }

    /// Use a different language for month folder names
    pub fn with_month_language(mut self, language: Language) -> Self {
        self.month_language = language;
        self
    }

    /// Reject configurations the engine cannot plan with
    pub fn validate(&self) -> Result<()> {
        if self.destination_root.as_os_str().is_empty() {
            return Err(Error::EmptyDestinationRoot);
        }
        Ok(())
    }
}

/// Configuration for the photo sorter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Files or directories to sort
    #[serde(default)]
    pub inputs: Vec<PathBuf>,

    /// Root of the destination tree
    pub destination_root: PathBuf,

    /// Directories to exclude from scanning (can be absolute paths or folder names)
    #[serde(default)]
    pub exclude_dirs: Vec<PathBuf>,

    /// Nest by year
    pub by_year: bool,

    /// Nest by month
    pub by_month: bool,

    /// Nest by day
    pub by_day: bool,

    /// Rename files to their capture timestamp
    pub rename_by_timestamp: bool,

    /// Month folder language; detected from the system locale when unset
    #[serde(default)]
    pub month_language: Option<Language>,

    /// Move or copy
    pub operation: RelocationMode,

    /// Resolve dates of `IMG-yyyyMMdd-WA…` files from their names
    #[serde(default)]
    pub messenger_dates: bool,

    /// Hours added to messenger filename dates
    #[serde(default = "default_messenger_offset")]
    pub messenger_offset_hours: i64,

    /// Number of threads for parallel processing (0 = auto)
    pub threads: usize,

    /// Plan and preview only
    pub dry_run: bool,

    /// Verbose output
    pub verbose: bool,
}

fn default_messenger_offset() -> i64 {
    DEFAULT_MESSENGER_OFFSET_HOURS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inputs: vec![],
            destination_root: PathBuf::new(),
            exclude_dirs: vec![],
            by_year: true,
            by_month: true,
            by_day: false,
            rename_by_timestamp: false,
            month_language: None,
            operation: RelocationMode::default(),
            messenger_dates: false,
            messenger_offset_hours: DEFAULT_MESSENGER_OFFSET_HOURS,
            threads: 0, // Auto-detect
            dry_run: false,
            verbose: false,
        }
    }
}

impl Config {
    /// Build the immutable layout configuration for one run
    ///
    /// An unset month language falls back to the system locale.
    pub fn sort_configuration(&self) -> SortConfiguration {
        SortConfiguration {
            by_year: self.by_year,
            by_month: self.by_month,
            by_day: self.by_day,
            rename_by_timestamp: self.rename_by_timestamp,
            destination_root: self.destination_root.clone(),
            month_language: self.month_language.unwrap_or_else(Language::detect),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> std::result::Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> std::result::Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError { source: e })?;

        fs::write(path, content).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    /// Generate a sample configuration file content
    pub fn sample_config() -> String {
        r#"# Photo Date Sorter Configuration File
# This file uses TOML format (https://toml.io)

# Files or directories to sort (searched recursively)
inputs = [
    "/home/me/Pictures/Import",
]

# Root of the sorted tree
destination_root = "/home/me/Pictures/Sorted"

# Directories to exclude from scanning
# Can be absolute paths or folder names (will match any folder with that name)
exclude_dirs = [
    ".thumbnails",
    "@eaDir",
]

# Folder nesting
# - by_year:  2015/
# - by_month: 07-July/
# - by_day:   09/
by_year = true
by_month = true
by_day = false

# Rename files to their capture time: 2015-07-09_18-43-04.jpg
rename_by_timestamp = false

# Month folder language: "en", "de" or "zh" (system locale when omitted)
# month_language = "en"

# File operation: "copy" or "move"
operation = "copy"

# Take dates of IMG-yyyyMMdd-WA0001.jpg style files from their names
messenger_dates = false
messenger_offset_hours = 12

# Number of threads for parallel processing (0 = auto-detect)
threads = 0

# Dry run mode - show the plan without touching any file
dry_run = false

# Verbose output - show detailed processing information
verbose = false
"#
        .to_string()
    }
}

/// Errors that can occur when loading or saving configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read configuration file
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse configuration file
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// Failed to write configuration file
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to serialize configuration
    SerializeError { source: toml::ser::Error },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError { path, source } => {
                write!(f, "Failed to read config file '{}': {}", path.display(), source)
            }
            ConfigError::ParseError { path, source } => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), source)
            }
            ConfigError::WriteError { path, source } => {
                write!(f, "Failed to write config file '{}': {}", path.display(), source)
            }
            ConfigError::SerializeError { source } => {
                write!(f, "Failed to serialize config: {}", source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ReadError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
            ConfigError::WriteError { source, .. } => Some(source),
            ConfigError::SerializeError { source } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_config_parses() {
        let config: Config = toml::from_str(&Config::sample_config()).unwrap();
        assert!(config.by_year);
        assert!(config.by_month);
        assert!(!config.by_day);
        assert_eq!(config.operation, RelocationMode::Copy);
        assert_eq!(config.messenger_offset_hours, 12);
        assert_eq!(config.exclude_dirs.len(), 2);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("sorter.toml");

        let config = Config {
            destination_root: PathBuf::from("/out"),
            month_language: Some(Language::German),
            operation: RelocationMode::Move,
            ..Config::default()
        };
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.destination_root, PathBuf::from("/out"));
        assert_eq!(loaded.month_language, Some(Language::German));
        assert_eq!(loaded.operation, RelocationMode::Move);
    }

    #[test]
    fn test_missing_config_file() {
        let err = Config::load_from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn test_sort_configuration_uses_explicit_language() {
        let config = Config {
            destination_root: PathBuf::from("/out"),
            month_language: Some(Language::ChineseSimplified),
            ..Config::default()
        };
        let sort = config.sort_configuration();
        assert_eq!(sort.month_language, Language::ChineseSimplified);
        assert_eq!(sort.destination_root, PathBuf::from("/out"));
    }

    #[test]
    fn test_empty_root_rejected() {
        let sort = SortConfiguration::new("", true, true, false, false);
        assert!(matches!(sort.validate(), Err(Error::EmptyDestinationRoot)));
        let sort = SortConfiguration::new("/out", true, true, false, false);
        assert!(sort.validate().is_ok());
    }
}
