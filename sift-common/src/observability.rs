//! Logging setup shared by the `sift` binary and tests.
//!
//! Events go to a daily rolling file; stderr is opt-in because the terminal
//! UI owns the screen in interactive mode. [`init_logging`] installs the
//! global subscriber once and keeps answering with the same file path.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

static INSTALLED: OnceLock<(PathBuf, WorkerGuard)> = OnceLock::new();

/// Overrides the log directory when the config leaves it unset.
pub const LOG_DIR_ENV: &str = "SIFT_LOG_DIR";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Names the log file and the default data directory.
    pub app_name: &'static str,
    /// Explicit directory; else `SIFT_LOG_DIR`, else `~/.local/share/<app_name>`.
    pub log_dir: Option<PathBuf>,
    /// Duplicate events to stderr. Keep off while the TUI is running.
    pub emit_stderr: bool,
    pub format: LogFormat,
    /// Used when `RUST_LOG` is unset or invalid.
    pub default_filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            app_name: "sift",
            log_dir: None,
            emit_stderr: false,
            format: LogFormat::Text,
            default_filter: "info".to_string(),
        }
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global `tracing` subscriber and return today's log file.
pub fn init_logging(config: LogConfig) -> anyhow::Result<PathBuf> {
    if let Some((path, _)) = INSTALLED.get() {
        return Ok(path.clone());
    }

    let dir = log_dir(config.app_name, config.log_dir.as_deref());
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating log directory {}", dir.display()))?;

    let file_name = format!("{}.log", config.app_name);
    let path = log_file_path(&dir, &file_name, Local::now().date_naive());
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(&dir, &file_name));

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));
    tracing_subscriber::registry()
        .with(layers(config.format, writer, config.emit_stderr))
        .with(filter)
        .try_init()
        .context("installing tracing subscriber")?;

    tracing::debug!(
        target: "observability",
        path = %path.display(),
        format = ?config.format,
        stderr = config.emit_stderr,
        "logging.initialised"
    );

    let _ = INSTALLED.set((path.clone(), guard));
    Ok(path)
}

fn layers(format: LogFormat, file: NonBlocking, stderr: bool) -> Vec<BoxedLayer> {
    let mut out = Vec::with_capacity(2);
    match format {
        LogFormat::Text => {
            out.push(fmt::layer().with_writer(file).with_ansi(false).boxed());
            if stderr {
                out.push(fmt::layer().with_writer(std::io::stderr).boxed());
            }
        }
        LogFormat::Json => {
            out.push(fmt::layer().json().with_writer(file).boxed());
            if stderr {
                out.push(fmt::layer().json().with_writer(std::io::stderr).boxed());
            }
        }
    }
    out
}

/// Name `tracing_appender::rolling::daily` gives the file for `day`.
fn log_file_path(dir: &Path, file_name: &str, day: NaiveDate) -> PathBuf {
    dir.join(format!("{file_name}.{}", day.format("%Y-%m-%d")))
}

fn log_dir(app_name: &str, explicit: Option<&Path>) -> PathBuf {
    let home = std::env::var_os("HOME").map(PathBuf::from);
    let chosen = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(LOG_DIR_ENV).map(PathBuf::from));
    match (chosen, home) {
        (Some(dir), Some(home)) => match dir.strip_prefix("~") {
            Ok(rest) => home.join(rest),
            Err(_) => dir,
        },
        (Some(dir), None) => dir,
        (None, Some(home)) => home.join(".local/share").join(app_name),
        (None, None) => PathBuf::from(app_name),
    }
}
