// Disk cleaning functionality
pub mod temp_files;
pub mod trash;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::scheduler::config::DeleteMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    PermissionDenied,
    InUse,
    NotFound,
    PathTooLong,
    Other,
}

impl FailureKind {
    pub fn classify(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => return FailureKind::PermissionDenied,
            io::ErrorKind::NotFound => return FailureKind::NotFound,
            _ => {}
        }

        match err.raw_os_error() {
            #[cfg(windows)]
            Some(32) | Some(33) => FailureKind::InUse, // ERROR_SHARING_VIOLATION, ERROR_LOCK_VIOLATION
            #[cfg(windows)]
            Some(206) => FailureKind::PathTooLong, // ERROR_FILENAME_EXCED_RANGE
            #[cfg(unix)]
            Some(code) if code == libc::EBUSY || code == libc::ETXTBSY => FailureKind::InUse,
            #[cfg(unix)]
            Some(code) if code == libc::ENAMETOOLONG => FailureKind::PathTooLong,
            _ => FailureKind::Other,
        }
    }
}

/// A single entry that could not be removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepFailure {
    pub path: PathBuf,
    pub kind: FailureKind,
    pub reason: String,
}

impl SweepFailure {
    pub fn from_io(path: impl Into<PathBuf>, err: &io::Error) -> Self {
        Self {
            path: path.into(),
            kind: FailureKind::classify(err),
            reason: err.to_string(),
        }
    }
}

/// Outcome of one sweep over one target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    pub target: PathBuf,
    pub mode: DeleteMode,
    pub start_time: DateTime<Local>,
    pub end_time: Option<DateTime<Local>>,
    pub attempted: u32,
    pub succeeded: u32,
    pub failures: Vec<SweepFailure>,
    pub target_missing: bool,
    pub is_completed: bool,
}

impl SweepReport {
    pub fn new(target: &Path, mode: DeleteMode) -> Self {
        Self {
            target: target.to_path_buf(),
            mode,
            start_time: Local::now(),
            end_time: None,
            attempted: 0,
            succeeded: 0,
            failures: Vec::new(),
            target_missing: false,
            is_completed: false,
        }
    }

    pub fn record_success(&mut self) {
        self.attempted += 1;
        self.succeeded += 1;
    }

    pub fn record_failure(&mut self, failure: SweepFailure) {
        self.attempted += 1;
        self.failures.push(failure);
    }

    pub fn failed(&self) -> u32 {
        self.failures.len() as u32
    }

    pub fn is_clean(&self) -> bool {
        !self.target_missing && self.failures.is_empty()
    }

    pub fn complete(&mut self) {
        self.end_time = Some(Local::now());
        self.is_completed = true;
    }
}

/// Creates `path` (and its parents) if it does not exist yet. Never fails the caller.
pub fn ensure_directory(path: &Path) -> bool {
    if path.is_dir() {
        tracing::info!("Directory '{}' already exists.", path.display());
        return true;
    }

    match fs::create_dir_all(path) {
        Ok(()) => {
            tracing::info!("Directory '{}' created.", path.display());
            true
        }
        Err(e) => {
            tracing::error!("Failed to create directory '{}': {}", path.display(), e);
            false
        }
    }
}
