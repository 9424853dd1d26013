use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Hourly rolling log file under `dir`. Keep the guard alive until exit.
pub fn init(dir: &Path, filter: &str) -> color_eyre::Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::hourly(dir, "ef-fop.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(EnvFilter::try_new(filter)?)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_ansi(false)
        .try_init()
        .map_err(|e| color_eyre::eyre::eyre!(e))?;
    Ok(guard)
}
