//! CLI argument parsing with clap

use crate::config::{Config, RelocationMode};
use crate::i18n::Language;
use clap::Parser;
use std::path::PathBuf;

/// Photo Date Sorter - sorts images into a date-based folder tree
///
/// Every image below the given paths is dated from its EXIF capture time
/// (falling back to file creation and modification time) and copied or
/// moved to DESTINATION/yyyy/MM-Month/. Existing files are never
/// overwritten; clashing names get a -1, -2, ... suffix.
#[derive(Parser, Debug)]
#[command(name = "photo-sorter")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Files or directories to sort
    pub paths: Vec<PathBuf>,

    /// Path to configuration file (TOML format)
    ///
    /// CLI arguments override config file settings.
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// Root of the sorted tree
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Nest by year (yyyy/)
    ///
    /// Giving any of --year, --month, --day replaces the configured nesting.
    #[arg(short, long)]
    pub year: bool,

    /// Nest by month (MM-Month/)
    #[arg(short, long)]
    pub month: bool,

    /// Nest by day (dd/)
    #[arg(short, long)]
    pub day: bool,

    /// Rename files to yyyy-MM-dd_HH-mm-ss
    #[arg(short, long)]
    pub rename: bool,

    /// File operation mode
    #[arg(short = 'O', long, value_enum)]
    pub operation: Option<RelocationMode>,

    /// Language of month folder names (default: system locale)
    #[arg(long, value_enum)]
    pub language: Option<Language>,

    /// Date IMG-yyyyMMdd-WA… files by their name instead of metadata
    #[arg(long)]
    pub messenger_dates: bool,

    /// Hours added to messenger filename dates
    #[arg(long, allow_hyphen_values = true)]
    pub messenger_offset: Option<i64>,

    /// Directories to exclude (absolute paths or folder names)
    #[arg(long, num_args = 1..)]
    pub exclude: Option<Vec<PathBuf>>,

    /// Number of threads for parallel processing (0 = auto)
    #[arg(short = 't', long)]
    pub threads: Option<usize>,

    /// Dry run mode - show the plan without touching any file
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Write the plan and results as JSON
    #[arg(long)]
    pub plan_json: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Output log format as JSON
    #[arg(long)]
    pub json_log: bool,

    /// Also write the log to this file
    #[arg(long, env = "PHOTO_SORTER_LOG")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    fn nesting_given(&self) -> bool {
        self.year || self.month || self.day
    }

    /// Merge CLI arguments with config from file
    /// CLI arguments take precedence over config file settings
    pub fn merge_with_config(&self, mut config: Config) -> Config {
        if !self.paths.is_empty() {
            config.inputs = self.paths.clone();
        }
        if let Some(ref output) = self.output {
            config.destination_root = output.clone();
        }
        if self.nesting_given() {
            config.by_year = self.year;
            config.by_month = self.month;
            config.by_day = self.day;
        }
        if self.rename {
            config.rename_by_timestamp = true;
        }
        if let Some(operation) = self.operation {
            config.operation = operation;
        }
        if let Some(language) = self.language {
            config.month_language = Some(language);
        }
        if self.messenger_dates {
            config.messenger_dates = true;
        }
        if let Some(offset) = self.messenger_offset {
            config.messenger_offset_hours = offset;
        }
        if let Some(ref exclude) = self.exclude {
            config.exclude_dirs = exclude.clone();
        }
        if let Some(threads) = self.threads {
            config.threads = threads;
        }
        if self.dry_run {
            config.dry_run = true;
        }
        if self.verbose {
            config.verbose = true;
        }

        config
    }

    /// Convert CLI arguments to Config (when no config file is used)
    pub fn to_config(&self) -> Config {
        self.merge_with_config(Config::default())
    }
}
