use std::path::PathBuf;
use std::sync::OnceLock;

use dossier_common::observability::{init_logging, LogConfig, LogFormat};

/// Route test logs to stderr and a scratch file, once per test binary.
///
/// `DOSSIER_LOG_FORMAT=json` switches the encoding.
pub fn init_test_tracing() {
    static LOG_FILE: OnceLock<PathBuf> = OnceLock::new();
    LOG_FILE.get_or_init(|| {
        let format = match std::env::var("DOSSIER_LOG_FORMAT") {
            Ok(raw) if raw.trim().eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };
        init_logging(LogConfig {
            app_name: "dossier-tests",
            log_dir: Some(std::env::temp_dir().join("dossier-tests")),
            emit_stderr: true,
            format,
            default_filter: "debug".into(),
        })
        .unwrap_or_default()
    });
}
