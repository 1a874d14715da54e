// Scheduler module for periodic cleaning
pub mod config;

use chrono::{Duration as ChronoDuration, Local};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::disk::temp_files::Cleaner;
use crate::disk::SweepReport;
use crate::scheduler::config::{ScheduleConfig, TargetSpec};

/// Runs a sweep over every target, then waits for the interval, forever.
pub struct Scheduler {
    targets: Vec<TargetSpec>,
    interval: Duration,
    cleaner: Cleaner,
    cycles: AtomicU64,
}

impl Scheduler {
    /// No minimum interval is enforced here; `ScheduleConfig::validate` owns that.
    pub fn new(config: ScheduleConfig, cleaner: Cleaner) -> Self {
        let interval = Duration::try_from_secs_f64(config.interval_hours * 3600.0)
            .unwrap_or(Duration::MAX);
        Self {
            targets: config.targets,
            interval,
            cleaner,
            cycles: AtomicU64::new(0),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of sweep cycles finished since start.
    pub fn cycles_completed(&self) -> u64 {
        self.cycles.load(Ordering::Relaxed)
    }

    /// Sweeps all targets once, in configuration order.
    pub fn run_cycle(&self) -> Vec<SweepReport> {
        tracing::info!("Starting cleanup at {}", Local::now().format("%Y-%m-%d %H:%M:%S"));

        let reports: Vec<SweepReport> = self
            .targets
            .iter()
            .map(|target| self.cleaner.sweep(target))
            .collect();

        self.cycles.fetch_add(1, Ordering::Relaxed);
        reports
    }

    /// Never returns. The process is expected to be terminated from outside.
    pub async fn run(&self) {
        loop {
            let reports = self.run_cycle();
            let failed: u32 = reports.iter().map(SweepReport::failed).sum();
            let succeeded: u32 = reports.iter().map(|r| r.succeeded).sum();
            tracing::info!(
                targets = reports.len(),
                succeeded,
                failed,
                "Cleanup cycle finished"
            );

            let next = ChronoDuration::from_std(self.interval)
                .ok()
                .and_then(|d| Local::now().checked_add_signed(d));
            match next {
                Some(at) => tracing::info!(
                    "Next check in {:.2} hours ({})",
                    self.interval.as_secs_f64() / 3600.0,
                    at.format("%Y-%m-%d %H:%M:%S")
                ),
                None => tracing::info!("Next check in {:.2} hours", self.interval.as_secs_f64() / 3600.0),
            }

            tokio::time::sleep(self.interval).await;
        }
    }
}
