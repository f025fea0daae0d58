//! Batch orchestration
//!
//! Scans for sources, plans mirrored destinations, then fans jobs out to a
//! bounded worker pool. A Ctrl-C interrupt stops dispatch, terminates the
//! in-flight codec subprocess pairs, and surfaces a cancelled batch.

use crate::config::Settings;
use crate::discovery;
use crate::error::{FlacpressError, Result};
use crate::planner;
use crate::transcode;
use crate::types::{CancelFlag, TranscodeJob};
use crossbeam_channel::unbounded;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Batch result summary
#[derive(Debug)]
pub struct BatchResult {
    pub total_files: usize,
    pub converted: usize,
    pub failed: usize,
    pub skipped: usize,
    /// True when the batch was stopped by an interrupt rather than finishing
    pub cancelled: bool,
}

impl BatchResult {
    fn empty() -> Self {
        Self {
            total_files: 0,
            converted: 0,
            failed: 0,
            skipped: 0,
            cancelled: false,
        }
    }
}

/// Run the full conversion batch
pub fn run(settings: &Settings) -> Result<BatchResult> {
    let batch_start = Instant::now();

    // Phase 1: Discovery
    info!("Scanning for FLAC files...");
    let files = discovery::scan(&settings.input, settings.recursive)?;
    if files.is_empty() {
        return Ok(BatchResult::empty());
    }

    // Phase 2: Planning
    let sources: Vec<PathBuf> = files.into_iter().map(|f| f.path).collect();
    let jobs = planner::plan(&sources, &source_root(&settings.input), &settings.output);

    // Destinations that already exist are skipped unless --force
    let (jobs, skipped): (Vec<_>, Vec<_>) = if settings.force {
        debug!("Force mode enabled, re-converting existing outputs");
        (jobs, Vec::new())
    } else {
        jobs.into_iter()
            .partition(|job| !job.destination.exists())
    };

    let skipped_count = skipped.len();
    if skipped_count > 0 {
        info!(
            "Skipping {} already-converted files (use --force to re-convert)",
            skipped_count
        );
    }

    let total_files = jobs.len() + skipped_count;
    if jobs.is_empty() {
        info!("All files already converted, nothing to do");
        return Ok(BatchResult {
            total_files,
            skipped: skipped_count,
            ..BatchResult::empty()
        });
    }

    // Every destination directory exists before the first job starts.
    planner::create_destination_dirs(&jobs)?;

    let cancel = CancelFlag::new();
    let interrupted = CancelFlag::new();
    install_interrupt_handler(&cancel, &interrupted);

    // Phase 3: Conversion
    info!(
        "Converting {} files with {} workers",
        jobs.len(),
        settings.jobs
    );
    let convert_start = Instant::now();

    let (converted, failed) = dispatch(&jobs, settings.jobs, &cancel, settings.show_progress, |job| {
        info!("Converting {}", job.source.display());
        transcode::run(job, settings, &cancel)
    });

    let elapsed = convert_start.elapsed().as_secs_f64();
    if interrupted.is_cancelled() {
        warn!("Batch interrupted after {:.2}s", elapsed);
    } else {
        info!("Conversion completed in {:.2}s", elapsed);
    }
    info!(
        "Total batch time: {:.2}s",
        batch_start.elapsed().as_secs_f64()
    );

    Ok(BatchResult {
        total_files,
        converted,
        failed,
        skipped: skipped_count,
        cancelled: interrupted.is_cancelled(),
    })
}

/// Run `run_job` over the job list with at most `workers` concurrent slots.
///
/// The queue delivers each job to exactly one worker. Once `cancel` is set
/// no further jobs are dispatched; in-flight jobs observe the flag
/// themselves. Returns (converted, failed) counts.
pub fn dispatch<F>(
    jobs: &[TranscodeJob],
    workers: usize,
    cancel: &CancelFlag,
    show_progress: bool,
    run_job: F,
) -> (usize, usize)
where
    F: Fn(&TranscodeJob) -> Result<()> + Sync,
{
    let (tx, rx) = unbounded::<&TranscodeJob>();
    for job in jobs {
        // The queue is pre-filled while the receiver is alive; send cannot fail.
        let _ = tx.send(job);
    }
    drop(tx);

    let progress = if show_progress {
        let pb = ProgressBar::new(jobs.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    let converted = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);

    thread::scope(|scope| {
        for _ in 0..workers.max(1) {
            let rx = rx.clone();
            let run_job = &run_job;
            let converted = &converted;
            let failed = &failed;
            let progress = progress.as_ref();
            scope.spawn(move || {
                while let Ok(job) = rx.recv() {
                    if cancel.is_cancelled() {
                        break;
                    }
                    match run_job(job) {
                        Ok(()) => {
                            converted.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(FlacpressError::Cancelled) => break,
                        Err(e) if e.is_recoverable() => {
                            error!("Failed {}: {}", job.source.display(), e);
                            failed.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(e) => {
                            // Environment-level problem (permissions, disk);
                            // stop pulling new jobs.
                            error!("Aborting batch: {}", e);
                            failed.fetch_add(1, Ordering::Relaxed);
                            cancel.cancel();
                            break;
                        }
                    }
                    if let Some(pb) = progress {
                        pb.inc(1);
                        pb.set_message(
                            job.source
                                .file_name()
                                .unwrap_or_default()
                                .to_string_lossy()
                                .to_string(),
                        );
                    }
                }
            });
        }
    });

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    (
        converted.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed),
    )
}

/// Route Ctrl-C into the shared flags observed by workers and jobs.
fn install_interrupt_handler(cancel: &CancelFlag, interrupted: &CancelFlag) {
    let cancel = cancel.clone();
    let interrupted = interrupted.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        warn!("Interrupt received, stopping in-flight conversions...");
        interrupted.cancel();
        cancel.cancel();
    }) {
        // A handler left over from an earlier batch in the same process
        debug!("Ctrl-C handler not installed: {}", e);
    }
}

/// Directory whose structure is mirrored under the output directory.
fn source_root(input: &Path) -> PathBuf {
    if input.is_dir() {
        input.to_path_buf()
    } else {
        input.parent().map(Path::to_path_buf).unwrap_or_default()
    }
}
