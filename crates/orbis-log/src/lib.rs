//! Tracing subscriber setup for Orbis.
//!
//! Console output is always on. Debug builds additionally write JSON lines
//! to `orbis.log` in the log directory. Records emitted through the `log`
//! facade by the library crates are forwarded into the same subscriber.

use std::path::{Path, PathBuf};

use orbis_config::Config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor the config names a level.
pub const DEFAULT_FILTER: &str = "info,wgpu=warn,naga=warn";

/// File name of the JSON log written in debug builds.
pub const LOG_FILE_NAME: &str = "orbis.log";

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `config.debug.log_level`, which wins over
/// [`DEFAULT_FILTER`]. Returns the path of the JSON log file when one was opened.
pub fn init_logging(
    log_dir: Option<&Path>,
    debug_build: bool,
    config: Option<&Config>,
) -> Option<PathBuf> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config_env_filter(config.map(|c| c.debug.log_level.as_str())));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if debug_build
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(log_file_path(log_dir))
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        subscriber.with(file_layer).init();
        return Some(log_file_path(log_dir));
    }

    subscriber.init();
    None
}

/// Filter directives for a configured level; blank falls back to [`DEFAULT_FILTER`].
pub fn filter_directives(config_level: Option<&str>) -> String {
    match config_level.map(str::trim) {
        Some(level) if !level.is_empty() => level.to_string(),
        _ => DEFAULT_FILTER.to_string(),
    }
}

/// Filter for a configured level. Directives that fail to parse fall back to [`DEFAULT_FILTER`].
pub fn config_env_filter(config_level: Option<&str>) -> EnvFilter {
    EnvFilter::try_new(filter_directives(config_level)).unwrap_or_else(|_| default_env_filter())
}

pub fn log_file_path(log_dir: &Path) -> PathBuf {
    log_dir.join(LOG_FILE_NAME)
}

pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}
