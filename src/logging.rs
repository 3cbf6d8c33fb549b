// File: ./src/logging.rs
use crate::storage::LocalStorage;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE: &str = "jikanwari.log";

/// Routes `tracing` output to a file in the data dir; the terminal belongs to the UI.
/// Keep the returned guard alive for the whole run or buffered lines are lost.
pub fn init() -> Option<WorkerGuard> {
    let dir = LocalStorage::data_dir()?;
    let file_appender = tracing_appender::rolling::never(dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let result = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("jikanwari=info")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .try_init();

    result.ok().map(|_| guard)
}
