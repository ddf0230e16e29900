use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Overrides where the log file goes.
pub const LOG_FILE_ENV: &str = "GEMCHAT_LOG_FILE";

const DEFAULT_FILTER: &str = "gemchat=info,gemchat_core=info";

/// Log file location: `$GEMCHAT_LOG_FILE`, else `gemchat.log` in `config_dir`.
pub fn log_path(env_value: Option<String>, config_dir: &Path) -> PathBuf {
    env_value
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| config_dir.join("gemchat.log"))
}

/// The terminal owns stderr while the UI runs, so everything goes to a file.
pub fn init_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_path_prefers_env() {
        let dir = Path::new("/tmp/gemchat-config");
        assert_eq!(
            log_path(Some("/var/log/chat.log".to_string()), dir),
            PathBuf::from("/var/log/chat.log")
        );
        assert_eq!(log_path(Some(" ".to_string()), dir), dir.join("gemchat.log"));
        assert_eq!(log_path(None, dir), dir.join("gemchat.log"));
    }
}
