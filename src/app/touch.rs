use crate::utils::error::{Result, SyncError};
use async_trait::async_trait;
use filetime::FileTime;
use std::io;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::watch;

#[derive(Debug, Clone)]
pub struct TouchOptions {
    pub batch_size: usize,
    pub delay: Duration,
    pub verbose: bool,
    /// Substrings; any path containing one is skipped (a skipped directory is not descended).
    pub ignore: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TouchReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub batch_sizes: Vec<usize>,
    pub pauses: usize,
    pub interrupted: bool,
}

impl TouchReport {
    pub fn is_success(&self) -> bool {
        self.failed == 0 && !self.interrupted
    }
}

/// Pause between batches. `pause` returns `false` when the run was interrupted.
#[async_trait]
pub trait Throttle: Send {
    fn interrupted(&self) -> bool;

    async fn pause(&mut self, delay: Duration) -> bool;
}

/// Real sleeps, cut short by Ctrl-C
pub struct SleepThrottle {
    interrupt: watch::Receiver<bool>,
}

impl SleepThrottle {
    /// Spawns a Ctrl-C listener; must be called inside a tokio runtime.
    pub fn with_ctrl_c() -> Self {
        let (tx, rx) = watch::channel(false);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = tx.send(true);
            }
        });
        Self { interrupt: rx }
    }

    pub fn from_receiver(interrupt: watch::Receiver<bool>) -> Self {
        Self { interrupt }
    }
}

#[async_trait]
impl Throttle for SleepThrottle {
    fn interrupted(&self) -> bool {
        *self.interrupt.borrow()
    }

    async fn pause(&mut self, delay: Duration) -> bool {
        if self.interrupted() {
            return false;
        }
        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);

        let signalled = tokio::select! {
            _ = &mut sleep => return true,
            changed = self.interrupt.changed() => changed.is_ok(),
        };
        if !signalled {
            // listener gone, finish the normal delay
            sleep.await;
        }
        !self.interrupted()
    }
}

fn is_ignored(path: &Path, ignore: &[String]) -> bool {
    let text = path.to_string_lossy();
    ignore.iter().any(|pattern| text.contains(pattern.as_str()))
}

/// Top-down walk: each directory, then its files, then its sub-directories.
/// Entries are sorted by name. Unreadable sub-directories are skipped with a warning.
/// Symlinks to directories are neither followed nor returned.
pub fn collect_paths(root: &Path, ignore: &[String]) -> io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    walk(root, ignore, &mut paths, true)?;
    Ok(paths)
}

fn walk(dir: &Path, ignore: &[String], paths: &mut Vec<PathBuf>, is_root: bool) -> io::Result<()> {
    let mut entries = match std::fs::read_dir(dir) {
        Ok(read_dir) => read_dir.collect::<io::Result<Vec<_>>>()?,
        Err(e) if !is_root => {
            tracing::warn!("⚠️ Skipping unreadable directory {}: {}", dir.display(), e);
            return Ok(());
        }
        Err(e) => return Err(e),
    };
    entries.sort_by_key(|entry| entry.file_name());

    paths.push(dir.to_path_buf());

    let mut subdirs = Vec::new();
    for entry in entries {
        let path = entry.path();
        if is_ignored(&path, ignore) {
            continue;
        }
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            subdirs.push(path);
        } else if file_type.is_symlink() && path.is_dir() {
            // 指向目錄的連結不追蹤也不 touch
            tracing::debug!("Skipping directory symlink {}", path.display());
        } else {
            paths.push(path);
        }
    }

    for subdir in subdirs {
        walk(&subdir, ignore, paths, false)?;
    }
    Ok(())
}

/// `0..total` cut into consecutive ranges of at most `batch_size`.
pub fn batch_ranges(total: usize, batch_size: usize) -> Vec<Range<usize>> {
    let size = batch_size.max(1);
    (0..total)
        .step_by(size)
        .map(|start| start..(start + size).min(total))
        .collect()
}

/// Sets access and modification time to now.
pub fn touch_path(path: &Path) -> io::Result<()> {
    let now = FileTime::now();
    filetime::set_file_times(path, now, now)
}

/// Touches `paths` batch by batch with a pause between batches (none after the
/// last). An interrupt ends the run early and is recorded in the report.
pub async fn touch_in_batches<T, F>(
    paths: &[PathBuf],
    options: &TouchOptions,
    throttle: &mut T,
    mut toucher: F,
) -> TouchReport
where
    T: Throttle,
    F: FnMut(&Path) -> io::Result<()>,
{
    let total = paths.len();
    let ranges = batch_ranges(total, options.batch_size);
    let batch_count = ranges.len();
    let mut report = TouchReport {
        total,
        ..Default::default()
    };

    'batches: for (index, range) in ranges.into_iter().enumerate() {
        tracing::info!(
            "Batch {} - Processing {} items ({}-{} of {})",
            index + 1,
            range.len(),
            range.start + 1,
            range.end,
            total
        );
        let started = Instant::now();
        report.batch_sizes.push(range.len());

        for path in &paths[range] {
            if throttle.interrupted() {
                report.interrupted = true;
                break 'batches;
            }
            match toucher(path) {
                Ok(()) => {
                    report.succeeded += 1;
                    if options.verbose {
                        tracing::info!("Touched: {}", path.display());
                    }
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::error!("❌ Error touching {}: {}", path.display(), e);
                }
            }
        }

        tracing::info!(
            "Batch {} completed in {:.2} seconds",
            index + 1,
            started.elapsed().as_secs_f64()
        );

        if index + 1 < batch_count {
            if options.verbose {
                tracing::info!("Waiting {} seconds before next batch...", options.delay.as_secs());
            }
            report.pauses += 1;
            if !throttle.pause(options.delay).await {
                report.interrupted = true;
                break;
            }
        }
    }

    if report.interrupted {
        tracing::warn!("⚠️ Process interrupted by user!");
        tracing::info!("Progress: {}/{} files and directories processed", report.succeeded, total);
    } else {
        tracing::info!(
            "✅ Touching complete: {}/{} files and directories processed successfully",
            report.succeeded,
            total
        );
        if report.failed > 0 {
            tracing::warn!("Errors encountered: {}", report.failed);
        }
    }

    report
}

/// Validates `directory`, walks it and touches everything found.
pub async fn run_touch<T: Throttle>(
    directory: &Path,
    options: &TouchOptions,
    throttle: &mut T,
) -> Result<TouchReport> {
    if !directory.is_dir() {
        return Err(SyncError::InvalidConfigValueError {
            field: "directory".to_string(),
            value: directory.display().to_string(),
            reason: "not a valid directory or cannot be accessed".to_string(),
        });
    }

    let paths = collect_paths(directory, &options.ignore)?;
    if paths.is_empty() {
        return Err(SyncError::ProcessingError {
            message: format!("No files or directories found in {}", directory.display()),
        });
    }
    tracing::info!("Found {} files and directories to touch", paths.len());

    Ok(touch_in_batches(&paths, options, throttle, touch_path).await)
}

/// `~` expansion plus absolute path, as shown in the start banner.
pub fn resolve_directory(raw: &str) -> io::Result<PathBuf> {
    let expanded = match raw.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join(rest.trim_start_matches('/')),
            None => PathBuf::from(raw),
        },
        _ => PathBuf::from(raw),
    };
    std::path::absolute(expanded)
}
