//! Where richedit keeps its files
//!
//! ```text
//! <config>/richedit/
//! ├── config.yaml
//! └── logs/richedit.log.YYYY-MM-DD
//! ```
//!
//! `<config>` is `$XDG_CONFIG_HOME` or `~/.config` on Unix/macOS and
//! `%APPDATA%` on Windows.

use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "richedit";
const CONFIG_FILE: &str = "config.yaml";
const LOGS_DIR: &str = "logs";

/// Base name of the rolling log file; the appender adds a date suffix.
pub const LOG_FILE_PREFIX: &str = "richedit.log";

fn platform_config_home() -> Option<PathBuf> {
    if cfg!(target_os = "windows") {
        return std::env::var_os("APPDATA").map(PathBuf::from);
    }
    std::env::var_os("XDG_CONFIG_HOME")
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
}

pub fn config_dir() -> Option<PathBuf> {
    platform_config_home().map(|home| home.join(APP_DIR))
}

pub fn config_file() -> Option<PathBuf> {
    Some(config_dir()?.join(CONFIG_FILE))
}

pub fn logs_dir() -> Option<PathBuf> {
    Some(config_dir()?.join(LOGS_DIR))
}

/// Newest rotated log in the logs directory, or the undated base name when
/// nothing has been written yet.
pub fn log_file() -> Option<PathBuf> {
    let dir = logs_dir()?;
    Some(newest_log_in(&dir).unwrap_or_else(|| dir.join(LOG_FILE_PREFIX)))
}

/// Date suffixes (`YYYY-MM-DD`) order lexically, so the greatest name wins.
fn newest_log_in(dir: &Path) -> Option<PathBuf> {
    fs::read_dir(dir)
        .ok()?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(LOG_FILE_PREFIX))
        })
        .max()
}

/// Create the logs directory (and the config directory above it).
pub fn ensure_logs_dir() -> Result<PathBuf, String> {
    let dir = logs_dir().ok_or_else(|| "No config directory available".to_string())?;
    fs::create_dir_all(&dir)
        .map_err(|e| format!("Failed to create directory {}: {}", dir.display(), e))?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_log_picks_latest_date() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "richedit.log.2026-01-07",
            "richedit.log.2026-03-01",
            "other.txt",
        ] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        assert_eq!(
            newest_log_in(dir.path()),
            Some(dir.path().join("richedit.log.2026-03-01"))
        );
    }

    #[test]
    fn test_newest_log_none_for_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(newest_log_in(&dir.path().join("absent")), None);
    }
}
