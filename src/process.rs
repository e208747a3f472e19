//! Batch orchestration with Rayon parallel processing
//!
//! A run goes through two phases:
//! - Plan: discover files, resolve dates, compute destinations (read-only)
//! - Commit: resolve collisions and move/copy each planned file
//!
//! The [`Sorter`] owns every [`MediaItem`] of the current run and is the only
//! place their status changes.

use crate::collision::resolve_available_path;
use crate::config::{RelocationMode, SortConfiguration};
use crate::discover::{Discovery, DiscoveryWarning};
use crate::error::{Error, RelocationError, Result};
use crate::layout::destination_path;
use crate::relocate::relocate;
use crate::time::{DateMode, DateResolver, ResolvedDate};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{Level, debug, error, info, span, warn};

/// How often a lost race for a destination name is retried
const RELOCATE_ATTEMPTS: usize = 3;

/// Lifecycle of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunPhase {
    Idle,
    Discovering,
    Planned,
    Committing,
    Done,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunPhase::Idle => "idle",
            RunPhase::Discovering => "discovering",
            RunPhase::Planned => "planned",
            RunPhase::Committing => "committing",
            RunPhase::Done => "done",
        };
        f.write_str(name)
    }
}

/// Status of a single file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    /// Discovered, not planned yet
    Pending,
    /// Destination computed, waiting for commit
    Planned,
    /// No date could be resolved; never committed
    Skipped,
    /// Moved to its destination
    Moved,
    /// Copied to its destination
    Copied,
    /// Relocation failed
    Failed,
}

/// One image file of a run
#[derive(Debug, Clone, Serialize)]
pub struct MediaItem {
    source: PathBuf,
    date: Option<ResolvedDate>,
    date_mode: DateMode,
    planned: Option<PathBuf>,
    destination: Option<PathBuf>,
    status: ItemStatus,
    error: Option<String>,
}

impl MediaItem {
    fn new(source: PathBuf) -> Self {
        Self {
            source,
            date: None,
            date_mode: DateMode::DefaultChain,
            planned: None,
            destination: None,
            status: ItemStatus::Pending,
            error: None,
        }
    }

    /// Absolute source path
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Resolved capture time
    pub fn date(&self) -> Option<&ResolvedDate> {
        self.date.as_ref()
    }

    pub fn date_mode(&self) -> DateMode {
        self.date_mode
    }

    /// Destination computed in the plan phase, before collision handling
    pub fn planned_destination(&self) -> Option<&Path> {
        self.planned.as_deref()
    }

    /// Path actually written in the commit phase
    pub fn destination(&self) -> Option<&Path> {
        self.destination.as_deref()
    }

    pub fn status(&self) -> ItemStatus {
        self.status
    }

    /// Why the item was skipped or failed
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Resolve the date and compute the destination
    fn plan(&mut self, mode: DateMode, resolver: &DateResolver, config: &SortConfiguration) {
        self.date_mode = mode;
        self.date = resolver.resolve_with(&self.source, mode);
        self.planned = self
            .date
            .and_then(|date| destination_path(&self.source, &date.timestamp, config));

        match (&self.date, &self.planned) {
            (Some(_), Some(_)) => {
                self.status = ItemStatus::Planned;
                self.error = None;
            }
            (None, _) => {
                self.status = ItemStatus::Skipped;
                self.error = Some("no capture date could be resolved".to_string());
            }
            (Some(_), None) => {
                self.status = ItemStatus::Skipped;
                self.error = Some("source has no file name".to_string());
            }
        }
    }
}

/// Processing statistics, readable from other threads while a run commits
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub discovered: AtomicUsize,
    pub planned: AtomicUsize,
    pub skipped: AtomicUsize,
    pub processed: AtomicUsize,
    pub moved: AtomicUsize,
    pub copied: AtomicUsize,
    pub failed: AtomicUsize,
}

impl Clone for ProcessingStats {
    fn clone(&self) -> Self {
        Self {
            discovered: AtomicUsize::new(self.discovered.load(Ordering::Relaxed)),
            planned: AtomicUsize::new(self.planned.load(Ordering::Relaxed)),
            skipped: AtomicUsize::new(self.skipped.load(Ordering::Relaxed)),
            processed: AtomicUsize::new(self.processed.load(Ordering::Relaxed)),
            moved: AtomicUsize::new(self.moved.load(Ordering::Relaxed)),
            copied: AtomicUsize::new(self.copied.load(Ordering::Relaxed)),
            failed: AtomicUsize::new(self.failed.load(Ordering::Relaxed)),
        }
    }
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self::default()
    }

    fn reset(&self) {
        for counter in [
            &self.discovered,
            &self.planned,
            &self.skipped,
            &self.processed,
            &self.moved,
            &self.copied,
            &self.failed,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Discovered: {}, Planned: {}, Skipped: {}, Moved: {}, Copied: {}, Failed: {}",
            self.discovered.load(Ordering::Relaxed),
            self.planned.load(Ordering::Relaxed),
            self.skipped.load(Ordering::Relaxed),
            self.moved.load(Ordering::Relaxed),
            self.copied.load(Ordering::Relaxed),
            self.failed.load(Ordering::Relaxed)
        )
    }
}

/// An item that could not be relocated
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedItem {
    pub source: PathBuf,
    pub reason: String,
}

/// Outcome of a run, by status
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub moved: usize,
    pub copied: usize,
    pub failed: Vec<FailedItem>,
    pub skipped: Vec<PathBuf>,
    /// Planned items not committed (yet)
    pub pending: usize,
}

/// One mutex per destination directory
///
/// Collision check and write of one item must not interleave with another
/// item targeting the same directory.
#[derive(Debug, Default)]
struct DirectoryLocks(Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>);

impl DirectoryLocks {
    fn for_dir(&self, dir: &Path) -> Arc<Mutex<()>> {
        let mut locks = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        locks.entry(dir.to_path_buf()).or_default().clone()
    }
}

/// Drives the plan and commit phases of a sorting run
#[derive(Debug)]
pub struct Sorter {
    config: SortConfiguration,
    discovery: Discovery,
    resolver: DateResolver,
    pool: rayon::ThreadPool,
    phase: RunPhase,
    items: Vec<MediaItem>,
    index: HashMap<PathBuf, usize>,
    warnings: Vec<DiscoveryWarning>,
    stats: Arc<ProcessingStats>,
}

impl Sorter {
    /// Create a sorter with the standard date chain
    pub fn new(config: SortConfiguration) -> Result<Self> {
        Self::with_parts(config, Discovery::new(), DateResolver::new(), 0)
    }

    /// Create a sorter from explicit collaborators
    ///
    /// `threads` bounds the worker pool; 0 picks the number of CPUs.
    pub fn with_parts(
        config: SortConfiguration,
        discovery: Discovery,
        resolver: DateResolver,
        threads: usize,
    ) -> Result<Self> {
        config.validate()?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("sorter-{}", i))
            .build()
            .map_err(|e| Error::Config(format!("Failed to start worker pool: {}", e)))?;

        Ok(Self {
            config,
            discovery,
            resolver,
            pool,
            phase: RunPhase::Idle,
            items: Vec::new(),
            index: HashMap::new(),
            warnings: Vec::new(),
            stats: Arc::new(ProcessingStats::new()),
        })
    }

    pub fn config(&self) -> &SortConfiguration {
        &self.config
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Items of the current run, in discovery order
    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    /// Number of discovered image files
    pub fn discovered_count(&self) -> usize {
        self.items.len()
    }

    /// Problems met during discovery
    pub fn warnings(&self) -> &[DiscoveryWarning] {
        &self.warnings
    }

    /// Get processing statistics reference
    pub fn stats(&self) -> &ProcessingStats {
        &self.stats
    }

    /// Get a clone of the internal stats Arc for shared access
    pub fn stats_arc(&self) -> Arc<ProcessingStats> {
        self.stats.clone()
    }

    /// Discover image files below `roots` and plan them
    ///
    /// Adds to the current plan; after a finished commit it starts a new run.
    /// Never touches the destination tree.
    pub fn discover(&mut self, roots: &[PathBuf]) -> Result<&[MediaItem]> {
        match self.phase {
            RunPhase::Committing | RunPhase::Discovering => {
                return Err(Error::InvalidPhase {
                    action: "discover",
                    phase: self.phase,
                });
            }
            RunPhase::Done => self.reset(),
            RunPhase::Idle | RunPhase::Planned => {}
        }

        let _span = span!(Level::INFO, "plan").entered();
        self.phase = RunPhase::Discovering;

        let report = self.discovery.discover(roots);
        self.warnings.extend(report.warnings);

        let new_files: Vec<PathBuf> = report
            .files
            .into_iter()
            .filter(|path| !self.index.contains_key(path))
            .collect();

        let resolver = &self.resolver;
        let config = &self.config;
        let planned: Vec<MediaItem> = self.pool.install(|| {
            new_files
                .into_par_iter()
                .map(|source| {
                    let mut item = MediaItem::new(source);
                    item.plan(DateMode::DefaultChain, resolver, config);
                    item
                })
                .collect()
        });

        for item in planned {
            self.index.insert(item.source.clone(), self.items.len());
            self.items.push(item);
        }

        self.refresh_plan_stats();
        self.phase = RunPhase::Planned;
        info!("{}", self.stats.summary());

        Ok(&self.items)
    }

    /// Re-plan one item with a different date mode
    pub fn set_date_mode(&mut self, source: &Path, mode: DateMode) -> Result<&MediaItem> {
        if self.phase != RunPhase::Planned {
            return Err(Error::InvalidPhase {
                action: "change the date mode",
                phase: self.phase,
            });
        }

        let index = self
            .index
            .get(source)
            .copied()
            .or_else(|| {
                fs::canonicalize(source)
                    .ok()
                    .and_then(|p| self.index.get(&p).copied())
            })
            .ok_or_else(|| Error::UnknownItem {
                path: source.to_path_buf(),
            })?;

        self.items[index].plan(mode, &self.resolver, &self.config);
        self.refresh_plan_stats();
        debug!(?source, ?mode, status = ?self.items[index].status, "Re-planned item");

        Ok(&self.items[index])
    }

    /// Relocate every planned item
    ///
    /// Allowed once per run, only after planning. Per-item failures are
    /// recorded on the item and never abort the batch.
    pub fn commit(&mut self, mode: RelocationMode) -> Result<RunSummary> {
        if self.phase != RunPhase::Planned {
            return Err(Error::InvalidPhase {
                action: "commit",
                phase: self.phase,
            });
        }
        self.config.validate()?;

        let _span = span!(Level::INFO, "commit", ?mode).entered();
        self.phase = RunPhase::Committing;

        let work: Vec<(usize, PathBuf, PathBuf)> = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.status == ItemStatus::Planned)
            .filter_map(|(i, item)| Some((i, item.source.clone(), item.planned.clone()?)))
            .collect();

        info!(count = work.len(), "Committing planned files");

        let locks = DirectoryLocks::default();
        let stats = &self.stats;
        let outcomes: Vec<(usize, Result<PathBuf>)> = self.pool.install(|| {
            work.par_iter()
                .map(|(i, source, planned)| {
                    let outcome = commit_one(source, planned, mode, &locks);
                    match &outcome {
                        Ok(dest) => {
                            info!(?source, destination = ?dest, "Processed file");
                            let counter = match mode {
                                RelocationMode::Move => &stats.moved,
                                RelocationMode::Copy => &stats.copied,
                            };
                            counter.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(e) => {
                            error!(?source, ?planned, error = %e, "Failed to process file");
                            stats.failed.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                    stats.processed.fetch_add(1, Ordering::Relaxed);
                    (*i, outcome)
                })
                .collect()
        });

        for (i, outcome) in outcomes {
            let item = &mut self.items[i];
            match outcome {
                Ok(dest) => {
                    item.destination = Some(dest);
                    item.status = match mode {
                        RelocationMode::Move => ItemStatus::Moved,
                        RelocationMode::Copy => ItemStatus::Copied,
                    };
                }
                Err(e) => {
                    item.status = ItemStatus::Failed;
                    item.error = Some(e.to_string());
                }
            }
        }

        self.phase = RunPhase::Done;
        info!("{}", self.stats.summary());

        Ok(self.summary())
    }

    /// Discard the current file list and plan
    pub fn clear(&mut self) -> Result<()> {
        if matches!(self.phase, RunPhase::Committing | RunPhase::Discovering) {
            return Err(Error::InvalidPhase {
                action: "clear",
                phase: self.phase,
            });
        }
        self.reset();
        Ok(())
    }

    /// Summarize the current run by status
    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary::default();
        for item in &self.items {
            match item.status {
                ItemStatus::Moved => summary.moved += 1,
                ItemStatus::Copied => summary.copied += 1,
                ItemStatus::Failed => summary.failed.push(FailedItem {
                    source: item.source.clone(),
                    reason: item.error.clone().unwrap_or_default(),
                }),
                ItemStatus::Skipped => summary.skipped.push(item.source.clone()),
                ItemStatus::Pending | ItemStatus::Planned => summary.pending += 1,
            }
        }
        summary
    }

    fn reset(&mut self) {
        self.items.clear();
        self.index.clear();
        self.warnings.clear();
        self.stats.reset();
        self.phase = RunPhase::Idle;
    }

    fn refresh_plan_stats(&self) {
        let planned = self
            .items
            .iter()
            .filter(|item| item.status == ItemStatus::Planned)
            .count();
        let skipped = self
            .items
            .iter()
            .filter(|item| item.status == ItemStatus::Skipped)
            .count();
        self.stats.discovered.store(self.items.len(), Ordering::Relaxed);
        self.stats.planned.store(planned, Ordering::Relaxed);
        self.stats.skipped.store(skipped, Ordering::Relaxed);
    }
}

/// Collision check and relocation of one item, under its directory lock
fn commit_one(
    source: &Path,
    planned: &Path,
    mode: RelocationMode,
    locks: &DirectoryLocks,
) -> Result<PathBuf> {
    let dir = planned.parent().unwrap_or_else(|| Path::new(""));
    let lock = locks.for_dir(dir);
    let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

    if is_same_file(source, planned) {
        debug!(?source, "Already at its destination");
        return Ok(planned.to_path_buf());
    }

    relocate_with_retries(planned, |dest| relocate(source, dest, mode))
}

/// Whether `planned` names the file at `source` (already sorted)
fn is_same_file(source: &Path, planned: &Path) -> bool {
    match (fs::canonicalize(source), fs::canonicalize(planned)) {
        (Ok(source), Ok(planned)) => source == planned,
        _ => false,
    }
}

/// Pick a free name for `planned` and write to it
///
/// A destination that appears between the check and the write is a lost
/// race with another writer; the name is resolved again.
fn relocate_with_retries(
    planned: &Path,
    mut write: impl FnMut(&Path) -> std::result::Result<(), RelocationError>,
) -> Result<PathBuf> {
    for attempt in 1..=RELOCATE_ATTEMPTS {
        let dest = resolve_available_path(planned)?;
        match write(&dest) {
            Ok(()) => return Ok(dest),
            Err(RelocationError::DestinationExists { path }) => {
                warn!(?path, attempt, "Destination appeared before write, retrying");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(Error::DestinationContested {
        path: planned.to_path_buf(),
        attempts: RELOCATE_ATTEMPTS,
    })
}
