//! Tracing/logging initialization.
//!
//! Two sinks share one filter: a human-readable console layer and a JSON
//! file layer rotated daily. Span fields recorded by request middleware are
//! attached to every event emitted inside the span.

use std::path::PathBuf;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Floor is `debug`; the HTTP stack is raised to `info` to keep it quiet.
pub const DEFAULT_DIRECTIVES: &str =
    "debug,hyper=info,hyper_util=info,h2=info,tower=info,tower_http=info,axum=info,reqwest=info";

/// Static logger configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Directory the rolling log files are written to (relative to the working dir).
    pub directory: PathBuf,
    /// File prefix; the date is appended on rotation (`log.txt.2026-10-16`).
    pub file_prefix: String,
    /// Filter directives used when `RUST_LOG` is not set.
    pub default_directives: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("logs"),
            file_prefix: "log.txt".to_string(),
            default_directives: DEFAULT_DIRECTIVES.to_string(),
        }
    }
}

/// Keeps the non-blocking file writer alive; dropping it flushes pending lines.
#[must_use = "dropping the guard stops the file sink"]
pub struct LoggingGuard {
    file: Option<WorkerGuard>,
}

impl LoggingGuard {
    /// Whether this guard owns the file writer (only the first `init` does).
    pub fn has_file_sink(&self) -> bool {
        self.file.is_some()
    }
}

impl std::fmt::Debug for LoggingGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggingGuard")
            .field("file_sink", &self.has_file_sink())
            .finish()
    }
}

fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.default_directives))
}

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls keep the first subscriber).
pub fn init(config: &LoggingConfig) -> anyhow::Result<LoggingGuard> {
    std::fs::create_dir_all(&config.directory).with_context(|| {
        format!("failed to create log directory {}", config.directory.display())
    })?;

    let appender = tracing_appender::rolling::daily(&config.directory, &config.file_prefix);
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let console = tracing_subscriber::fmt::layer().with_target(true);
    let file = tracing_subscriber::fmt::layer()
        .json()
        .with_ansi(false)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_writer(file_writer);

    let installed = tracing_subscriber::registry()
        .with(env_filter(config))
        .with(console)
        .with(file)
        .try_init()
        .is_ok();

    Ok(LoggingGuard {
        file: installed.then_some(guard),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_rolling_file_layout() {
        let cfg = LoggingConfig::default();
        assert_eq!(cfg.directory, PathBuf::from("logs"));
        assert_eq!(cfg.file_prefix, "log.txt");
        assert!(cfg.default_directives.starts_with("debug,"));
        assert!(cfg.default_directives.contains("axum=info"));
    }

    #[test]
    fn default_directives_parse() {
        assert!(EnvFilter::try_new(DEFAULT_DIRECTIVES).is_ok());
    }

    #[test]
    fn init_creates_log_directory_and_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = LoggingConfig {
            directory: tmp.path().join("nested").join("logs"),
            ..LoggingConfig::default()
        };

        let first = init(&cfg).unwrap();
        assert!(cfg.directory.is_dir());

        let second = init(&cfg).unwrap();
        assert!(!second.has_file_sink());
        drop(first);
    }
}
