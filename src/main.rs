//! Photo Date Sorter - command line front end
//!
//! Collects the input paths and layout options, previews the plan and
//! commits it. All sorting logic lives in the library.

use anyhow::Result;
use chrono::Duration;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use photo_date_sorter::report::{self, print_warning};
use photo_date_sorter::time::is_messenger_filename;
use photo_date_sorter::{
    Cli, Config, DateMode, DateResolver, Discovery, ProcessingStats, Sorter, init_locale,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{Level, debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

// Initialize i18n for this binary
rust_i18n::i18n!("locales", fallback = "en");

/// Convenience macro for translation
macro_rules! t {
    ($key:expr) => {
        rust_i18n::t!($key)
    };
    ($key:expr, $($tt:tt)*) => {
        rust_i18n::t!($key, $($tt)*)
    };
}

fn main() -> Result<()> {
    // Initialize locale based on system settings
    init_locale();

    let cli = Cli::parse();
    let _guard = setup_logging(&cli)?;

    info!(version = env!("CARGO_PKG_VERSION"), "Photo sorter starting");

    let config = load_config(&cli)?;
    if config.verbose {
        info!(?config, "Configuration loaded");
    }
    validate_config(&config)?;

    let offset = Duration::try_hours(config.messenger_offset_hours)
        .ok_or_else(|| anyhow::anyhow!("Messenger offset out of range"))?;
    let resolver = DateResolver::new().with_messenger_offset(offset);
    let discovery = Discovery::new().with_exclude_dirs(config.exclude_dirs.clone());
    let mut sorter =
        Sorter::with_parts(config.sort_configuration(), discovery, resolver, config.threads)?;

    sorter.discover(&config.inputs)?;
    for warning in sorter.warnings() {
        print_warning(&t!(
            "cli_discovery_warning",
            path = warning.path.display(),
            message = warning.message
        ));
    }

    if config.messenger_dates {
        apply_messenger_dates(&mut sorter)?;
    }

    if sorter.items().is_empty() {
        print_warning(&t!("cli_no_images"));
        return Ok(());
    }

    if config.dry_run || config.verbose {
        report::print_plan(sorter.items());
    }

    if !config.dry_run {
        commit_with_progress(&mut sorter, &config)?;
        if config.verbose {
            report::print_results(sorter.items());
        }
    }

    let summary = sorter.summary();
    report::display_summary(&summary, config.dry_run);

    if let Some(ref path) = cli.plan_json {
        report::write_plan_json(path, sorter.items(), &summary)?;
        info!(path = %path.display(), "Plan written");
    }
    if let Some(ref path) = cli.log_file {
        println!("{}", t!("cli_log_file", path = path.display()));
    }

    Ok(())
}

/// Switch every messenger export file to filename dating
fn apply_messenger_dates(sorter: &mut Sorter) -> Result<()> {
    let matching: Vec<PathBuf> = sorter
        .items()
        .iter()
        .map(|item| item.source().to_path_buf())
        .filter(|source| {
            source
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(is_messenger_filename)
        })
        .collect();

    debug!(count = matching.len(), "Using messenger filename dates");
    for source in matching {
        sorter.set_date_mode(&source, DateMode::MessengerFilename)?;
    }
    Ok(())
}

/// Commit the plan while a progress bar polls the shared counters
fn commit_with_progress(sorter: &mut Sorter, config: &Config) -> Result<()> {
    let stats = sorter.stats_arc();
    let total = stats.planned.load(Ordering::Relaxed) as u64;
    let done = AtomicBool::new(false);

    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::with_template("{msg} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("=> "),
    );
    bar.set_message(t!("cli_committing").to_string());

    let result = std::thread::scope(|scope| {
        scope.spawn(|| poll_progress(&bar, &stats, &done));
        let result = sorter.commit(config.operation);
        done.store(true, Ordering::Relaxed);
        result
    });

    bar.finish_and_clear();
    result?;
    Ok(())
}

fn poll_progress(bar: &ProgressBar, stats: &Arc<ProcessingStats>, done: &AtomicBool) {
    while !done.load(Ordering::Relaxed) {
        bar.set_position(stats.processed.load(Ordering::Relaxed) as u64);
        std::thread::sleep(std::time::Duration::from_millis(100));
    }
    bar.set_position(stats.processed.load(Ordering::Relaxed) as u64);
}

/// Load configuration from file or CLI arguments
fn load_config(cli: &Cli) -> Result<Config> {
    let config = match cli.config {
        Some(ref path) => {
            info!(config_file = %path.display(), "Loading configuration from file");
            cli.merge_with_config(Config::load_from_file(path)?)
        }
        None => cli.to_config(),
    };
    Ok(config)
}

/// Validate configuration before processing
fn validate_config(config: &Config) -> Result<()> {
    if config.inputs.is_empty() {
        anyhow::bail!("{}", t!("cli_no_inputs_error"));
    }
    if config.destination_root.as_os_str().is_empty() {
        anyhow::bail!("{}", t!("cli_no_output_error"));
    }

    let output = absolute(&config.destination_root);
    for input in &config.inputs {
        let input = absolute(input);
        if input.is_dir() && output.starts_with(&input) {
            anyhow::bail!(
                "{}",
                t!(
                    "cli_output_inside_input_error",
                    output = output.display(),
                    input = input.display()
                )
            );
        }
        if input.starts_with(&output) {
            anyhow::bail!(
                "{}",
                t!(
                    "cli_input_inside_output_error",
                    input = input.display(),
                    output = output.display()
                )
            );
        }
    }

    Ok(())
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Setup logging (console + optional file)
fn setup_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let (file_writer, guard) = match cli.log_file {
        Some(ref log_path) => {
            if let Some(parent) = log_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(log_path)?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            (Some(non_blocking), Some(guard))
        }
        None => (None, None),
    };

    let registry = tracing_subscriber::registry().with(env_filter);

    if cli.json_log {
        registry
            .with(file_writer.map(|w| fmt::layer().json().with_ansi(false).with_writer(w)))
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(file_writer.map(|w| fmt::layer().with_ansi(false).with_writer(w)))
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn config(inputs: Vec<PathBuf>, output: PathBuf) -> Config {
        Config {
            inputs,
            destination_root: output,
            ..Config::default()
        }
    }

    #[test]
    fn test_validate_accepts_separate_trees() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("in")).unwrap();
        let config = config(vec![dir.path().join("in")], dir.path().join("out"));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_rejects_output_inside_input() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("in")).unwrap();
        let config = config(vec![dir.path().join("in")], dir.path().join("in/sorted"));
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_rejects_input_inside_output() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        fs::create_dir_all(out.join("2015")).unwrap();

        assert!(validate_config(&config(vec![out.join("2015")], out.clone())).is_err());
        assert!(validate_config(&config(vec![out.clone()], out)).is_err());
    }
}
