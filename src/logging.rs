//! Diagnostic trail: console output plus an append-only log file.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const LOG_ENV: &str = "TEMPSWEEP_LOG";
pub const LOG_FILE: &str = "tempsweep.log";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("tempsweep=info"))
}

/// Installs the global subscriber. Calling it again leaves the first one in place.
///
/// The level comes from `TEMPSWEEP_LOG` (default `tempsweep=info`). If `log_dir`
/// cannot be created only the console layer is installed. Write errors on the
/// file are dropped by the appender.
///
/// Keep the returned guard alive for as long as lines should reach the file.
pub fn init_logging(log_dir: &Path) -> Option<WorkerGuard> {
    let console = fmt::layer().with_target(false).with_filter(env_filter());

    if let Err(e) = std::fs::create_dir_all(log_dir) {
        let _ = tracing_subscriber::registry().with(console).try_init();
        tracing::warn!("Log directory {} unavailable, console only: {}", log_dir.display(), e);
        return None;
    }

    let appender = match RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(LOG_FILE)
        .build(log_dir)
    {
        Ok(appender) => appender,
        Err(e) => {
            let _ = tracing_subscriber::registry().with(console).try_init();
            tracing::warn!("Cannot open {} in {}, console only: {}", LOG_FILE, log_dir.display(), e);
            return None;
        }
    };
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let file = fmt::layer()
        .with_ansi(false)
        .with_writer(writer)
        .with_filter(env_filter());

    match tracing_subscriber::registry().with(console).with(file).try_init() {
        Ok(()) => Some(guard),
        Err(_) => None,
    }
}
