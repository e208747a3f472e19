//! Terminal output for plans and run summaries, and JSON plan export

use crate::error::Result;
use crate::process::{ItemStatus, MediaItem, RunSummary};
use crossterm::style::{Color, Stylize, style};
use rust_i18n::t;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// CLI theme colors
pub struct CliTheme;

impl CliTheme {
    pub const SUCCESS: Color = Color::Green;
    pub const WARNING: Color = Color::Yellow;
    pub const ERROR: Color = Color::Red;
    pub const HINT: Color = Color::DarkGrey;
    pub const ACCENT: Color = Color::Cyan;
}

/// Number of failures listed before folding the rest
const MAX_LISTED_FAILURES: usize = 10;

pub fn print_separator() {
    println!("{}", "─".repeat(60));
}

pub fn print_title(title: &str) {
    println!("{:^60}", title.bold());
}

pub fn print_warning(msg: &str) {
    println!("{}{}", style("⚠ ").with(CliTheme::WARNING).bold(), msg);
}

pub fn print_error(msg: &str) {
    println!("{}{}", style("✗ ").with(CliTheme::ERROR).bold(), msg);
}

pub fn print_stat(key: &str, value: usize, color: Color) {
    println!(
        "  {}: {}",
        style(key).with(CliTheme::HINT),
        style(value).with(color).bold()
    );
}

fn print_result(icon: &str, color: Color, source: &Path, detail: &str) {
    println!(
        "  {} {} {}",
        style(icon).with(color).bold(),
        style(source.display()).italic(),
        style(detail).with(CliTheme::HINT)
    );
}

/// Show the planned destination of every item
pub fn print_plan(items: &[MediaItem]) {
    print_separator();
    print_title(&t!("plan_title"));
    print_separator();

    for item in items {
        match (item.status(), item.planned_destination()) {
            (ItemStatus::Planned, Some(dest)) => {
                let source = item
                    .date()
                    .map(|d| format!(" [{} {}]", d.timestamp, d.source))
                    .unwrap_or_default();
                print_result(
                    "→",
                    CliTheme::ACCENT,
                    item.source(),
                    &format!("{}{}", dest.display(), source),
                );
            }
            _ => {
                print_result(
                    "⊘",
                    CliTheme::WARNING,
                    item.source(),
                    item.error().unwrap_or(&t!("unknown_error")),
                );
            }
        }
    }
}

/// Show the final status of every committed item
pub fn print_results(items: &[MediaItem]) {
    print_separator();
    for item in items {
        let dest = item
            .destination()
            .map(|p| format!("→ {}", p.display()))
            .unwrap_or_default();
        match item.status() {
            ItemStatus::Moved | ItemStatus::Copied => {
                print_result("✓", CliTheme::SUCCESS, item.source(), &dest)
            }
            ItemStatus::Failed => print_result(
                "✗",
                CliTheme::ERROR,
                item.source(),
                item.error().unwrap_or(&t!("unknown_error")),
            ),
            ItemStatus::Skipped => print_result(
                "⊘",
                CliTheme::WARNING,
                item.source(),
                &t!("skipped_no_date"),
            ),
            ItemStatus::Pending | ItemStatus::Planned => {}
        }
    }
}

/// Display the run summary
pub fn display_summary(summary: &RunSummary, dry_run: bool) {
    print_separator();
    print_title(&t!("processing_complete"));
    print_separator();

    print_stat(&t!("stat_moved"), summary.moved, CliTheme::SUCCESS);
    print_stat(&t!("stat_copied"), summary.copied, CliTheme::SUCCESS);
    print_stat(&t!("stat_skipped"), summary.skipped.len(), CliTheme::WARNING);
    print_stat(&t!("stat_failed"), summary.failed.len(), CliTheme::ERROR);
    if dry_run {
        print_stat(&t!("stat_planned"), summary.pending, CliTheme::ACCENT);
    }

    if !summary.failed.is_empty() {
        print_separator();
        print_error(&t!("failed_files", count = summary.failed.len()));
        for failed in summary.failed.iter().take(MAX_LISTED_FAILURES) {
            println!(
                "  {}: {}",
                style(failed.source.display()).with(CliTheme::HINT),
                style(&failed.reason).with(CliTheme::ERROR)
            );
        }
        if summary.failed.len() > MAX_LISTED_FAILURES {
            println!(
                "  {}",
                t!("failed_files_more", count = summary.failed.len() - MAX_LISTED_FAILURES)
            );
        }
    }

    if dry_run {
        print_separator();
        print_warning(&t!("dry_run_notice"));
    }
}

#[derive(Serialize)]
struct PlanExport<'a> {
    items: &'a [MediaItem],
    summary: &'a RunSummary,
}

/// Write the plan (or the committed run) as pretty JSON
pub fn write_plan_json(path: &Path, items: &[MediaItem], summary: &RunSummary) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &PlanExport { items, summary })?;
    writer.flush()?;
    Ok(())
}
