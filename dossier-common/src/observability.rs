//! Process-wide `tracing` setup.
//!
//! Events go to a daily-rolled file (`<app>.log.YYYY-MM-DD`) and, when asked,
//! to stderr as well. stdout is left alone: it carries the report.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use chrono::Local;
use serde::Deserialize;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Keeps the background writer alive, and remembers where it writes.
struct Installed {
    _guard: WorkerGuard,
    path: PathBuf,
}

static INSTALLED: OnceLock<Installed> = OnceLock::new();

const LOG_DIR_ENV: &str = "DOSSIER_LOG_DIR";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Names the log file and the fallback directory.
    pub app_name: &'static str,
    /// Overrides `DOSSIER_LOG_DIR` and the per-user data dir.
    pub log_dir: Option<PathBuf>,
    pub emit_stderr: bool,
    pub format: LogFormat,
    /// Filter used when `RUST_LOG` is unset.
    pub default_filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            app_name: "dossier",
            log_dir: None,
            emit_stderr: false,
            format: LogFormat::default(),
            default_filter: "info".into(),
        }
    }
}

/// Install the global subscriber and return today's log file.
///
/// Only the first call installs anything; later calls return the path
/// chosen by the first.
pub fn init_logging(config: LogConfig) -> anyhow::Result<PathBuf> {
    if let Some(done) = INSTALLED.get() {
        return Ok(done.path.clone());
    }

    let dir = log_dir_for(&config);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating log directory {}", dir.display()))?;

    let file_name = format!("{}.log", config.app_name);
    let path = dir.join(format!(
        "{file_name}.{}",
        Local::now().format("%Y-%m-%d")
    ));
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(
        &dir, file_name,
    ));

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));
    install(config.format, config.emit_stderr, filter, writer)?;

    let installed = INSTALLED.get_or_init(|| Installed {
        _guard: guard,
        path,
    });
    Ok(installed.path.clone())
}

fn install(
    format: LogFormat,
    stderr: bool,
    filter: EnvFilter,
    file: NonBlocking,
) -> anyhow::Result<()> {
    let registry = tracing_subscriber::registry().with(filter);
    let result = match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(file))
            .with(stderr.then(|| fmt::layer().json().with_writer(std::io::stderr)))
            .try_init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_ansi(false).with_writer(file))
            .with(stderr.then(|| fmt::layer().with_writer(std::io::stderr)))
            .try_init(),
    };
    result.context("installing the tracing subscriber")
}

fn log_dir_for(config: &LogConfig) -> PathBuf {
    let configured = config
        .log_dir
        .clone()
        .or_else(|| std::env::var_os(LOG_DIR_ENV).map(PathBuf::from));
    match configured {
        Some(dir) => with_home(&dir),
        None => data_dir(config.app_name),
    }
}

/// Expand a leading `~/`.
fn with_home(path: &Path) -> PathBuf {
    let home = std::env::var_os("HOME");
    match (path.strip_prefix("~"), home) {
        (Ok(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => path.to_path_buf(),
    }
}

fn data_dir(app_name: &str) -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => [Path::new(&home), Path::new(".local/share"), Path::new(app_name)]
            .iter()
            .collect(),
        None => Path::new(".").join(app_name),
    }
}
