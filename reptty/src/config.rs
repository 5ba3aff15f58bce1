//! Configuration for the reptty runtime.
//!
//! Every value has a compile-time default and can be overridden at runtime
//! via a dedicated environment variable.

use std::path::PathBuf;
use std::time::Duration;

/// Fallback data directory when no home directory can be found.
const FALLBACK_DATA_DIR: &str = "./data";

/// Default debounce window for background saves (in milliseconds).
const DEFAULT_SAVE_DEBOUNCE_MS: u64 = 250;

/// Get the directory holding the persisted collection and settings.
///
/// Priority:
/// 1. `REPTTY_DATA_DIR` env variable if set
/// 2. `$HOME/.config/reptty/data`
/// 3. `./data` as fallback
pub fn get_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("REPTTY_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".config").join("reptty").join("data");
    }

    PathBuf::from(FALLBACK_DATA_DIR)
}

/// Get the directory for rolling log files.
///
/// Priority:
/// 1. `REPTTY_LOG_DIR` env variable if set
/// 2. `logs` under the data directory
pub fn get_log_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("REPTTY_LOG_DIR") {
        return PathBuf::from(dir);
    }

    get_data_dir().join("logs")
}

/// Get the debounce window for background saves.
///
/// Priority:
/// 1. `REPTTY_SAVE_DEBOUNCE_MS` env variable if set (falls back to the
///    default if the value cannot be parsed as a `u64`)
/// 2. 250 ms as fallback
pub fn get_save_debounce() -> Duration {
    let ms = std::env::var("REPTTY_SAVE_DEBOUNCE_MS")
        .ok()
        .map(|v| parse_millis(&v))
        .unwrap_or(DEFAULT_SAVE_DEBOUNCE_MS);
    Duration::from_millis(ms)
}

fn parse_millis(value: &str) -> u64 {
    value.trim().parse().unwrap_or(DEFAULT_SAVE_DEBOUNCE_MS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_data_dir() {
        let dir = get_data_dir();
        match std::env::var("REPTTY_DATA_DIR") {
            Ok(val) => assert_eq!(dir, PathBuf::from(val)),
            Err(_) => assert!(dir.ends_with("data")),
        }
    }

    #[test]
    fn test_get_log_dir() {
        let dir = get_log_dir();
        match std::env::var("REPTTY_LOG_DIR") {
            Ok(val) => assert_eq!(dir, PathBuf::from(val)),
            Err(_) => assert_eq!(dir, get_data_dir().join("logs")),
        }
    }

    #[test]
    fn test_get_save_debounce_default() {
        if std::env::var("REPTTY_SAVE_DEBOUNCE_MS").is_err() {
            assert_eq!(get_save_debounce(), Duration::from_millis(DEFAULT_SAVE_DEBOUNCE_MS));
        }
    }

    #[test]
    fn test_parse_millis_falls_back() {
        assert_eq!(parse_millis("40"), 40);
        assert_eq!(parse_millis(" 40 "), 40);
        assert_eq!(parse_millis("soon"), DEFAULT_SAVE_DEBOUNCE_MS);
        assert_eq!(parse_millis("-5"), DEFAULT_SAVE_DEBOUNCE_MS);
    }
}
