// Temporary folder cleaning

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::disk::trash::{SystemTrash, Trash};
use crate::disk::{FailureKind, SweepFailure, SweepReport};
use crate::scheduler::config::{DeleteMode, TargetSpec};

/// Empties configured target directories, one sweep at a time.
pub struct Cleaner {
    trash: Box<dyn Trash>,
}

impl Default for Cleaner {
    fn default() -> Self {
        Self::new(SystemTrash)
    }
}

impl Cleaner {
    pub fn new(trash: impl Trash + 'static) -> Self {
        Self {
            trash: Box::new(trash),
        }
    }

    /// Deletes every direct child of `target.path`. Directories go as a whole.
    ///
    /// Per-entry failures are collected in the report and never stop the sweep.
    /// A missing target is reported and left alone (it is never created here).
    pub fn sweep(&self, target: &TargetSpec) -> SweepReport {
        let mut report = SweepReport::new(&target.path, target.delete_mode);

        if !target.path.is_dir() {
            tracing::warn!("Target directory not found: {}", target.path.display());
            report.target_missing = true;
            // Not counted as an attempt, but it shows up among the failures.
            report.failures.push(SweepFailure {
                path: target.path.clone(),
                kind: FailureKind::NotFound,
                reason: "target missing".to_string(),
            });
            report.complete();
            return report;
        }

        tracing::info!("Cleaning {} ({})", target.path.display(), target.delete_mode);

        let (files, dirs) = self.list_children(&target.path, &mut report);

        for file in files {
            match self.remove_file(&file, target.delete_mode) {
                Ok(()) => report.record_success(),
                Err(e) => {
                    tracing::warn!("Failed to delete file {}: {}", file.display(), e);
                    report.record_failure(SweepFailure::from_io(file, &e));
                }
            }
        }

        for dir in dirs {
            match self.remove_dir(&dir, target.delete_mode) {
                Ok(()) => report.record_success(),
                Err(e) => {
                    tracing::warn!("Failed to delete folder {}: {}", dir.display(), e);
                    report.record_failure(SweepFailure::from_io(dir, &e));
                }
            }
        }

        report.complete();
        tracing::info!(
            path = %target.path.display(),
            attempted = report.attempted,
            succeeded = report.succeeded,
            failed = report.failed(),
            "Sweep finished"
        );
        report
    }

    // Files (and links) first, then directories.
    fn list_children(&self, root: &Path, report: &mut SweepReport) -> (Vec<PathBuf>, Vec<PathBuf>) {
        let mut files = Vec::new();
        let mut dirs = Vec::new();

        for entry in WalkDir::new(root).min_depth(1).max_depth(1).follow_links(false) {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_dir() {
                        dirs.push(entry.into_path());
                    } else {
                        files.push(entry.into_path());
                    }
                }
                Err(e) => {
                    let path = e.path().unwrap_or(root).to_path_buf();
                    tracing::warn!("Failed to read entry under {}: {}", root.display(), e);
                    let io_err = e
                        .into_io_error()
                        .unwrap_or_else(|| io::Error::other("filesystem loop"));
                    report.record_failure(SweepFailure::from_io(path, &io_err));
                }
            }
        }

        (files, dirs)
    }

    fn remove_file(&self, path: &Path, mode: DeleteMode) -> io::Result<()> {
        match mode {
            DeleteMode::RecycleBin => self.trash.delete(path),
            DeleteMode::PermanentDelete => fs::remove_file(path),
        }
    }

    fn remove_dir(&self, path: &Path, mode: DeleteMode) -> io::Result<()> {
        match mode {
            DeleteMode::RecycleBin => self.trash.delete(path),
            DeleteMode::PermanentDelete => fs::remove_dir_all(path),
        }
    }
}
