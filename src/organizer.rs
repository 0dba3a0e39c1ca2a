//! Directory organizer
//!
//! Handles the core logic of:
//! - Counting the input files for progress
//! - Walking the input roots
//! - Filtering by extension, planning the dated destination
//! - Skipping duplicates and renaming collisions
//! - Copying files into the output tree
//!
//! Processing is strictly sequential. [`Organizer::spawn`] moves the whole
//! batch onto one background thread and streams events back over a channel.

use crate::config::Config;
use crate::dedupe::{Resolution, resolve_collision};
use crate::error::{Error, Result};
use crate::locale::MonthLocale;
use crate::placement::{ensure_directory, plan_destination};
use crate::scan::{FileEntry, WalkEvent, Walker, count_files};
use crate::validate::validate_file_name;
use serde::Serialize;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};
use tracing::{Level, debug, error, info, span, warn};

/// What happened to a single discovered entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingOutcome {
    /// File was copied into the output tree
    Copied,
    /// Identical content already sits at the destination
    SkippedDuplicate,
    /// Extension is not in the allow-list
    SkippedExtension,
    /// File carries the platform hidden marker
    SkippedHidden,
    /// Destination file name failed validation
    SkippedInvalidName,
    /// Input root does not exist
    SkippedMissingDirectory,
    /// I/O failure while reading, comparing or copying
    Error,
}

impl ProcessingOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingOutcome::Copied => "copied",
            ProcessingOutcome::SkippedDuplicate => "duplicate",
            ProcessingOutcome::SkippedExtension => "unsupported extension",
            ProcessingOutcome::SkippedHidden => "hidden",
            ProcessingOutcome::SkippedInvalidName => "invalid name",
            ProcessingOutcome::SkippedMissingDirectory => "missing directory",
            ProcessingOutcome::Error => "error",
        }
    }

    /// Whether this outcome should be listed in the failure summary
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            ProcessingOutcome::Error | ProcessingOutcome::SkippedInvalidName
        )
    }
}

impl fmt::Display for ProcessingOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of processing a single entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    /// Source file (or missing input root)
    pub source: PathBuf,
    /// Destination written to, or the existing file for duplicates
    pub destination: Option<PathBuf>,
    pub outcome: ProcessingOutcome,
    /// Human-readable cause for skips and errors
    pub reason: Option<String>,
}

impl FileReport {
    fn new(source: impl Into<PathBuf>, outcome: ProcessingOutcome) -> Self {
        Self {
            source: source.into(),
            destination: None,
            outcome,
            reason: None,
        }
    }

    fn with_destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Immutable view of run progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ProgressSnapshot {
    pub processed: usize,
    pub total: usize,
}

impl ProgressSnapshot {
    /// Percentage complete; 0 for an empty batch and never above 100
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.processed as f64 / self.total as f64 * 100.0).min(100.0)
        }
    }

    /// `"N / total"`
    pub fn label(&self) -> String {
        format!("{} / {}", self.processed, self.total)
    }
}

/// Totals for a finished run, plus every entry that failed
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub processed: usize,
    pub copied: usize,
    pub duplicates: usize,
    pub skipped_extension: usize,
    pub skipped_hidden: usize,
    pub invalid_names: usize,
    pub missing_directories: usize,
    pub errors: usize,
    pub failures: Vec<FileReport>,
}

impl RunSummary {
    fn record(&mut self, report: &FileReport) {
        match report.outcome {
            ProcessingOutcome::Copied => self.copied += 1,
            ProcessingOutcome::SkippedDuplicate => self.duplicates += 1,
            ProcessingOutcome::SkippedExtension => self.skipped_extension += 1,
            ProcessingOutcome::SkippedHidden => self.skipped_hidden += 1,
            ProcessingOutcome::SkippedInvalidName => self.invalid_names += 1,
            ProcessingOutcome::SkippedMissingDirectory => self.missing_directories += 1,
            ProcessingOutcome::Error => self.errors += 1,
        }
        if report.outcome.is_failure() {
            self.failures.push(report.clone());
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Total: {}, Copied: {}, Duplicates: {}, Unsupported: {}, Hidden: {}, Invalid names: {}, Missing dirs: {}, Errors: {}",
            self.total,
            self.copied,
            self.duplicates,
            self.skipped_extension,
            self.skipped_hidden,
            self.invalid_names,
            self.missing_directories,
            self.errors
        )
    }

    /// Write the summary as pretty JSON
    pub fn write_report(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

/// Event emitted while a run progresses
#[derive(Debug, Clone)]
pub enum OrganizerEvent {
    /// Counting finished; `total` is the progress denominator
    Started { total: usize },
    /// One entry was handled
    File {
        report: FileReport,
        progress: ProgressSnapshot,
    },
    /// All input roots were walked
    Finished(RunSummary),
}

/// Handle to a run executing on a background thread
pub struct OrganizerHandle {
    events: Receiver<OrganizerEvent>,
    worker: JoinHandle<Result<RunSummary>>,
}

impl OrganizerHandle {
    /// Event stream; ends when the worker finishes
    pub fn events(&self) -> &Receiver<OrganizerEvent> {
        &self.events
    }

    /// Wait for the worker and return its summary
    pub fn join(self) -> Result<RunSummary> {
        self.worker
            .join()
            .map_err(|_| Error::Worker("organizer thread panicked".into()))?
    }
}

/// Organizes input roots into the dated output tree
pub struct Organizer {
    config: Config,
    locale: MonthLocale,
}

impl Organizer {
    /// Create an organizer; a `system` month locale is resolved here once
    pub fn new(config: Config) -> Self {
        let locale = config.month_locale.resolve();
        Self { config, locale }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of visible files under the input roots
    pub fn total_files_count(&self) -> usize {
        count_files(&self.config.input_dirs)
    }

    /// Run to completion on the current thread, returning every report
    pub fn run(&self) -> Result<Vec<FileReport>> {
        let mut reports = Vec::new();
        self.run_with(|event| {
            if let OrganizerEvent::File { report, .. } = event {
                reports.push(report);
            }
        })?;
        Ok(reports)
    }

    /// Run to completion on the current thread, feeding every event to `on_event`
    pub fn run_with<F>(&self, mut on_event: F) -> Result<RunSummary>
    where
        F: FnMut(OrganizerEvent),
    {
        let _span = span!(Level::INFO, "organizer_run").entered();

        info!("Counting input files...");
        let total = self.total_files_count();
        info!(total, "Found input files");
        on_event(OrganizerEvent::Started { total });

        fs::create_dir_all(&self.config.output_dir)?;

        let mut summary = RunSummary {
            total,
            ..RunSummary::default()
        };
        let mut processed = 0usize;

        for event in Walker::new(self.config.input_dirs.iter().cloned()) {
            let (report, counts) = match event {
                WalkEvent::MissingDirectory(dir) => {
                    warn!(?dir, "Input directory does not exist, skipping");
                    (
                        FileReport::new(dir, ProcessingOutcome::SkippedMissingDirectory)
                            .with_reason("directory does not exist"),
                        false,
                    )
                }
                WalkEvent::Hidden(path) => {
                    debug!(?path, "Skipping hidden file");
                    (FileReport::new(path, ProcessingOutcome::SkippedHidden), false)
                }
                WalkEvent::Failed { path, message } => {
                    error!(?path, error = %message, "Failed to read file metadata");
                    (
                        FileReport::new(path, ProcessingOutcome::Error).with_reason(message),
                        true,
                    )
                }
                WalkEvent::File(entry) => (self.process_file(&entry), true),
            };

            if counts {
                processed += 1;
            }
            summary.record(&report);

            let progress = ProgressSnapshot { processed, total };
            on_event(OrganizerEvent::File { report, progress });
        }

        summary.processed = processed;
        info!("{}", summary.summary());
        on_event(OrganizerEvent::Finished(summary.clone()));

        Ok(summary)
    }

    /// Run the whole batch on a single background thread
    pub fn spawn(self) -> OrganizerHandle {
        let (tx, rx) = mpsc::channel();

        let worker = thread::spawn(move || {
            self.run_with(|event| {
                // The receiver may have been dropped; the run still completes
                let _ = tx.send(event);
            })
        });

        OrganizerHandle { events: rx, worker }
    }

    /// Classify, place and copy one discovered file
    pub fn process_file(&self, entry: &FileEntry) -> FileReport {
        let _file_span = span!(Level::DEBUG, "process_file", path = ?entry.path).entered();

        if !self.config.is_allowed_extension(&entry.extension) {
            debug!(path = ?entry.path, extension = %entry.extension, "Skipping unsupported extension");
            return FileReport::new(&entry.path, ProcessingOutcome::SkippedExtension)
                .with_reason(format!("extension '{}' is not accepted", entry.extension));
        }

        let planned = plan_destination(entry, self.locale);
        let candidate = planned.file_path(&self.config.output_dir);

        let target = match resolve_collision(&entry.path, candidate) {
            Ok(Resolution::Duplicate(existing)) => {
                debug!(path = ?entry.path, ?existing, "Skipping duplicate file");
                return FileReport::new(&entry.path, ProcessingOutcome::SkippedDuplicate)
                    .with_destination(existing);
            }
            Ok(Resolution::Vacant(path)) => path,
            Ok(Resolution::Renamed(path)) => {
                debug!(path = ?entry.path, renamed = ?path, "Destination taken by different content, renaming");
                path
            }
            Err(e) => {
                error!(path = ?entry.path, error = %e, "Failed to check destination");
                return FileReport::new(&entry.path, ProcessingOutcome::Error)
                    .with_reason(e.to_string());
            }
        };

        let file_name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if let Err(violation) = validate_file_name(&file_name) {
            let err = Error::NameValidation {
                path: target.clone(),
                violation,
            };
            warn!(path = ?entry.path, error = %err, "Skipping file with invalid name");
            return FileReport::new(&entry.path, ProcessingOutcome::SkippedInvalidName)
                .with_destination(target)
                .with_reason(err.to_string());
        }

        if let Err(e) = ensure_directory(&planned.directory(&self.config.output_dir)) {
            error!(path = ?entry.path, error = %e, "Failed to create destination directory");
            return FileReport::new(&entry.path, ProcessingOutcome::Error)
                .with_destination(target)
                .with_reason(e.to_string());
        }

        debug!(source = ?entry.path, destination = ?target, "Copying file");
        if let Err(e) = copy_file(&entry.path, &target, self.config.preserve_mtime) {
            error!(source = ?entry.path, destination = ?target, error = %e, "Failed to copy file");
            return FileReport::new(&entry.path, ProcessingOutcome::Error)
                .with_destination(target)
                .with_reason(e.to_string());
        }

        info!(source = ?entry.path, destination = ?target, "Copied file");
        FileReport::new(&entry.path, ProcessingOutcome::Copied).with_destination(target)
    }
}

/// Copy file with buffered I/O, refusing to overwrite an existing file.
///
/// A copy that fails after the destination was created removes it again,
/// so no truncated file is left in the output tree.
fn copy_file(source: &Path, dest: &Path, preserve_mtime: bool) -> Result<()> {
    let src_file = File::open(source)?;
    let dest_file = OpenOptions::new().write(true).create_new(true).open(dest)?;

    if let Err(e) = stream_copy(src_file, dest_file) {
        if let Err(remove_err) = fs::remove_file(dest) {
            warn!(?dest, error = %remove_err, "Failed to remove partial copy");
        }
        return Err(e.into());
    }

    if preserve_mtime
        && let Ok(metadata) = fs::metadata(source)
        && let Ok(mtime) = metadata.modified()
        && let Err(e) = filetime::set_file_mtime(dest, filetime::FileTime::from_system_time(mtime))
    {
        warn!(?dest, error = %e, "Failed to preserve modification time");
    }

    Ok(())
}

fn stream_copy(src_file: File, dest_file: File) -> std::io::Result<()> {
    let mut reader = BufReader::with_capacity(256 * 1024, src_file);
    let mut writer = BufWriter::with_capacity(256 * 1024, dest_file);

    let mut buffer = vec![0u8; 256 * 1024];
    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        writer.write_all(&buffer[..bytes_read])?;
    }
    writer.flush()
}
