// ABOUTME: Tracing subscriber setup: stderr output plus an optional daily rolling log file.
// ABOUTME: RUST_LOG overrides the level chosen from the CLI flags.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{Error, Result};

/// Logging options derived from CLI flags and `deployer.yml`.
#[derive(Debug, Clone, Default)]
pub struct LogOptions<'a> {
    /// Default level when `RUST_LOG` is unset.
    pub level: &'a str,
    /// Also append to this file, rolled daily.
    pub file: Option<&'a Path>,
}

/// Install the global subscriber. Keep the returned guard alive until exit so
/// buffered file output is flushed.
pub fn init_logging(options: LogOptions<'_>) -> Result<Option<WorkerGuard>> {
    let level = if options.level.is_empty() {
        "info"
    } else {
        options.level
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard) = match options.file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|d| !d.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .ok_or_else(|| Error::Logging(format!("not a file path: {}", path.display())))?;
            std::fs::create_dir_all(dir)?;

            let appender = tracing_appender::rolling::daily(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))?;

    Ok(guard)
}
