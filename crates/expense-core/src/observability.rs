//! Process-wide tracing setup. Call [`init_observability`] from the entry
//! point; library code only emits events and never installs subscribers.

use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

static INIT: OnceCell<()> = OnceCell::new();

const DEFAULT_JSON_LOG_FILE: &str = "expense-report.logs.jsonl";

fn parse_bool_env(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "enabled" => Some(true),
        "0" | "false" | "no" | "off" | "disabled" => Some(false),
        _ => None,
    }
}

fn observability_enabled() -> bool {
    match std::env::var("EXPENSE_OBSERVABILITY_ENABLED") {
        Ok(value) => parse_bool_env(&value).unwrap_or(true),
        Err(_) => true,
    }
}

fn resolve_env_filter() -> tracing_subscriber::EnvFilter {
    if let Ok(level) = std::env::var("EXPENSE_LOG_LEVEL")
        && let Ok(filter) = tracing_subscriber::EnvFilter::try_new(level)
    {
        return filter;
    }
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
}

/// Non-rolling appender for `path`, creating missing parent directories.
/// An empty or bare filename lands in the current directory.
fn json_file_appender(path: &Path) -> RollingFileAppender {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        let _ = std::fs::create_dir_all(parent);
    }
    let dir: PathBuf = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(DEFAULT_JSON_LOG_FILE);
    tracing_appender::rolling::never(dir, file_name)
}

/// Install the global subscriber, once per process; later calls no-op.
///
/// Knobs, all optional:
/// - `EXPENSE_OBSERVABILITY_ENABLED` turns logging off entirely when falsy.
/// - `EXPENSE_LOG_LEVEL` (then `RUST_LOG`) picks the filter; default `info`.
/// - `EXPENSE_JSON_LOG_PATH` switches output from compact stdout lines to
///   JSONL appended at that path.
pub fn init_observability() {
    INIT.get_or_init(|| {
        if !observability_enabled() {
            return;
        }

        let env_filter = resolve_env_filter();
        if let Ok(path_raw) = std::env::var("EXPENSE_JSON_LOG_PATH") {
            let writer = json_file_appender(std::path::Path::new(&path_raw));
            let json_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_target(false)
                .with_writer(writer);
            let _ = tracing_subscriber::registry()
                .with(env_filter)
                .with(json_layer)
                .try_init();
        } else {
            let console_layer = tracing_subscriber::fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stdout);
            let _ = tracing_subscriber::registry()
                .with(env_filter)
                .with(console_layer)
                .try_init();
        }
    });
}
