use anyhow::Result;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;

/// Set up logging based on verbosity level. With `dev` the output goes to
/// a timestamped file in the current directory instead of stderr; the
/// returned guard must stay alive or the file writer stops flushing.
pub fn setup_logger(verbosity: u8, dev: bool) -> Result<Option<WorkerGuard>> {
    #[cfg(test)]
    {
        let _ = (verbosity, dev); // Use the arguments to avoid unused variable warnings
        return Ok(None);
    }

    #[cfg(not(test))]
    {
        let log_level = get_log_level(verbosity);
        if dev {
            let name = format!("scrib-{}.log", chrono::Local::now().format("%Y%m%d-%H%M%S"));
            let appender = tracing_appender::rolling::never(".", name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_max_level(log_level)
                .with_writer(writer)
                .with_ansi(false)
                .try_init()
                .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;
            Ok(Some(guard))
        } else {
            tracing_subscriber::fmt()
                .with_max_level(log_level)
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;
            Ok(None)
        }
    }
}

/// Get the appropriate log level based on verbosity
pub fn get_log_level(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::ERROR,
        1 => Level::WARN,
        2 => Level::INFO,
        3 => Level::DEBUG,
        _ => Level::TRACE,
    }
}
