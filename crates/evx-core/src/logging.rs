//! Tracing subscriber setup shared by the binaries.
//!
//! Filter precedence: `EVX_LOG` env var, then the explicit level (CLI flag),
//! then `[log] level` from the config file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

pub const LOG_ENV_VAR: &str = "EVX_LOG";

/// Noisy dependencies are capped below the user's level.
const DEPENDENCY_DIRECTIVES: &str = "hyper=warn,h2=warn,reqwest=warn";

/// Builds the filter directive string from the available sources.
pub fn resolve_filter(env: Option<&str>, cli_level: Option<&str>, config: &LogConfig) -> String {
    let level = [env, cli_level, Some(config.level.as_str())]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|level| !level.is_empty())
        .unwrap_or("warn");
    format!("{DEPENDENCY_DIRECTIVES},{level}")
}

/// Installs the global subscriber.
///
/// Logs go to `config.file` through a non-blocking writer when set, stderr
/// otherwise. Keep the returned guard alive until exit so buffered lines are
/// flushed.
pub fn init(cli_level: Option<&str>, config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let env = std::env::var(LOG_ENV_VAR).ok();
    let directives = resolve_filter(env.as_deref(), cli_level, config);
    let filter = EnvFilter::try_new(&directives)
        .with_context(|| format!("Invalid log filter '{directives}'"))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(false);

    let Some(file) = config.file.as_deref().filter(|f| !f.trim().is_empty()) else {
        builder
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {e}"))?;
        return Ok(None);
    };

    let path = Path::new(file);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    let appender = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    builder
        .with_ansi(false)
        .with_writer(writer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {e}"))?;

    Ok(Some(guard))
}
