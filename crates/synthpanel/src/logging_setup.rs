//! Subscriber setup for the command-line tool
//!
//! stdout carries command output (NRPN lines, dumps), so console logs go to
//! stderr. The optional log file is appended to across runs.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use synthpanel_control::LogConfig;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{
    filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer,
};

/// Keeps the file writer flushing until dropped
pub struct LogGuard {
    path: PathBuf,
    _worker: WorkerGuard,
}

impl LogGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Configured level, overridable through `RUST_LOG`
fn level_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(config.parse_level().into())
        .from_env_lossy()
}

fn open_log_file(config: &LogConfig) -> Result<(NonBlocking, LogGuard)> {
    config
        .ensure_log_directory()
        .with_context(|| format!("Failed to create log directory: {:?}", config.log_dir))?;

    let path = config.current_log_path();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file: {:?}", path))?;
    let (writer, worker) = tracing_appender::non_blocking(file);

    Ok((
        writer,
        LogGuard {
            path,
            _worker: worker,
        },
    ))
}

/// Install the global subscriber. The returned guard must outlive all logging.
pub fn init(config: &LogConfig) -> Result<Option<LogGuard>> {
    let console = config.console_output.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(level_filter(config))
    });

    let (file, guard) = if config.file_output {
        let (writer, guard) = open_log_file(config)?;
        let layer = fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_filter(level_filter(config));
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .init();

    let file = guard.as_ref().map(LogGuard::path);
    tracing::debug!(level = %config.level, ?file, "Logging ready");
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_log_file_created_and_appended() {
        let dir = TempDir::new().unwrap();
        let config = LogConfig {
            file_output: true,
            log_dir: dir.path().join("logs"),
            ..LogConfig::default()
        };
        std::fs::create_dir_all(&config.log_dir).unwrap();
        std::fs::write(config.current_log_path(), "earlier run\n").unwrap();

        let (mut writer, guard) = open_log_file(&config).unwrap();
        assert_eq!(guard.path(), config.current_log_path());
        writer.write_all(b"next run\n").unwrap();
        drop(writer);
        drop(guard);

        let contents = std::fs::read_to_string(config.current_log_path()).unwrap();
        assert_eq!(contents, "earlier run\nnext run\n");
    }

    #[test]
    fn test_missing_log_directory_is_created() {
        let dir = TempDir::new().unwrap();
        let config = LogConfig {
            log_dir: dir.path().join("nested").join("logs"),
            ..LogConfig::default()
        };

        let (_writer, guard) = open_log_file(&config).unwrap();
        assert!(config.log_dir.is_dir());
        assert!(guard.path().exists());
    }
}
