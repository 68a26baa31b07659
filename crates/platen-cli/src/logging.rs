//! File-based logging setup.
//!
//! Logs go to ${PLATEN_HOME}/logs so neither the alternate screen nor
//! line-mode stdout is polluted. The filter comes from RUST_LOG with an
//! `info` default. The returned guard must stay alive for the process
//! lifetime or buffered log lines are lost.

use anyhow::{Context, Result};
use platen_core::config::paths;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub fn init() -> Result<WorkerGuard> {
    let logs_dir = paths::logs_dir();
    std::fs::create_dir_all(&logs_dir)
        .with_context(|| format!("Failed to create log directory {}", logs_dir.display()))?;

    let appender = tracing_appender::rolling::daily(&logs_dir, "platen.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(guard)
}
