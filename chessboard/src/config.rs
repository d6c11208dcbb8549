//! Configuration for the chessboard client.
//!
//! Every tunable has a compile-time default and can be overridden at runtime
//! via a dedicated environment variable. Command-line flags, where present,
//! take priority over both.

use std::path::PathBuf;
use std::time::Duration;

/// Default backend base URL.
const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Default per-request timeout (in seconds).
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Default health probe interval (in milliseconds).
const DEFAULT_HEALTH_INTERVAL_MS: u64 = 5000;

/// Default delay before an "up" banner hides itself (in milliseconds).
const DEFAULT_BANNER_HIDE_MS: u64 = 3000;

/// Default log directory, relative to the working directory.
const DEFAULT_LOG_DIR: &str = "logs";

/// Get the backend base URL.
///
/// Priority:
/// 1. `CHESSBOARD_BACKEND_URL` env variable if set
/// 2. `http://localhost:8000` as fallback
pub fn get_backend_url() -> String {
    if let Ok(url) = std::env::var("CHESSBOARD_BACKEND_URL") {
        return url;
    }

    DEFAULT_BACKEND_URL.to_string()
}

/// Get the timeout applied to every session backend request.
///
/// Priority:
/// 1. `CHESSBOARD_REQUEST_TIMEOUT_SECS` env variable if set (falls back to
///    default if the value cannot be parsed as a `u64`)
/// 2. `10` seconds as fallback
pub fn get_request_timeout() -> Duration {
    Duration::from_secs(env_u64(
        "CHESSBOARD_REQUEST_TIMEOUT_SECS",
        DEFAULT_REQUEST_TIMEOUT_SECS,
    ))
}

/// Get the health probe interval.
///
/// Priority:
/// 1. `CHESSBOARD_HEALTH_INTERVAL_MS` env variable if set
/// 2. `5000` ms as fallback
pub fn get_health_interval() -> Duration {
    Duration::from_millis(env_u64(
        "CHESSBOARD_HEALTH_INTERVAL_MS",
        DEFAULT_HEALTH_INTERVAL_MS,
    ))
}

/// Get the auto-hide delay for the "backend up" banner.
///
/// Priority:
/// 1. `CHESSBOARD_BANNER_HIDE_MS` env variable if set
/// 2. `3000` ms as fallback
pub fn get_banner_hide_delay() -> Duration {
    Duration::from_millis(env_u64("CHESSBOARD_BANNER_HIDE_MS", DEFAULT_BANNER_HIDE_MS))
}

/// Get the directory daily log files are written to.
///
/// Priority:
/// 1. `CHESSBOARD_LOG_DIR` env variable if set
/// 2. `./logs` as fallback
pub fn get_log_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CHESSBOARD_LOG_DIR") {
        return PathBuf::from(dir);
    }

    PathBuf::from(DEFAULT_LOG_DIR)
}

fn env_u64(key: &str, default: u64) -> u64 {
    parse_or(std::env::var(key).ok().as_deref(), default)
}

fn parse_or(value: Option<&str>, default: u64) -> u64 {
    value
        .and_then(|v| v.trim().parse().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

/// Resolved settings for one client run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub backend_url: String,
    pub request_timeout: Duration,
    pub health_interval: Duration,
    pub banner_hide_delay: Duration,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self {
            backend_url: get_backend_url(),
            request_timeout: get_request_timeout(),
            health_interval: get_health_interval(),
            banner_hide_delay: get_banner_hide_delay(),
        }
    }

    /// Apply command-line overrides on top of the environment.
    pub fn with_overrides(mut self, backend_url: Option<String>, timeout_secs: Option<u64>) -> Self {
        if let Some(url) = backend_url {
            self.backend_url = url;
        }
        if let Some(secs) = timeout_secs.filter(|s| *s > 0) {
            self.request_timeout = Duration::from_secs(secs);
        }
        self
    }
}
