use anyhow::{Context, Result};
use dockhand_common::config_manager::Config;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, time::SystemTime},
    prelude::*,
    EnvFilter,
};

/// Installs the global subscriber. `RUST_LOG` wins over the configured level;
/// output goes to `log_file` when set and to stderr otherwise.
pub fn setup_logging(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("Invalid log level")?;

    match &config.log_file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            let file_name = path
                .file_name()
                .with_context(|| format!("Log file has no name: {}", path.display()))?;
            std::fs::create_dir_all(directory).with_context(|| {
                format!("Failed to create log directory {}", directory.display())
            })?;

            let file_appender = RollingFileAppender::new(Rotation::NEVER, directory, file_name);
            let file_layer = fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true)
                .with_target(true)
                .with_level(true)
                .with_ansi(false)
                .with_timer(SystemTime)
                .with_writer(file_appender);

            let subscriber = tracing_subscriber::registry().with(filter).with(file_layer);
            tracing::subscriber::set_global_default(subscriber)
                .context("Failed to set tracing subscriber")?;
            tracing::info!("Logging system initialized. Writing to {}", path.display());
        }
        None => {
            let stderr_layer = fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_timer(SystemTime)
                .with_writer(std::io::stderr);

            let subscriber = tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer);
            tracing::subscriber::set_global_default(subscriber)
                .context("Failed to set tracing subscriber")?;
        }
    }

    Ok(())
}
