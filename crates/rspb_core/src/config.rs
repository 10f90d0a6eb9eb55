//! Configuration loading from environment variables.

use crate::constants::{DEFAULT_SERVER_URL, DEFAULT_TIMEOUT_SECS, HISTORY_FILE_NAME};
use std::env;
use std::path::PathBuf;

/// Runtime configuration for the rspb client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub server_url: String,
    pub history_path: PathBuf,
    pub timeout_secs: u64,
    pub history_enabled: bool,
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: String) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = resolve_home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

fn resolve_home_dir() -> Option<PathBuf> {
    let non_blank = |name: &str| env::var(name).ok().filter(|v| !v.trim().is_empty());

    if let Some(home) = non_blank("HOME") {
        return Some(PathBuf::from(home));
    }
    // Windows
    if let Some(profile) = non_blank("USERPROFILE") {
        return Some(PathBuf::from(profile));
    }
    env::current_dir().ok()
}

/// Default location of the persisted paste history.
///
/// # Returns
/// `~/.cache/rspb/history.json`, or a relative path when no home is known.
pub fn default_history_path() -> PathBuf {
    resolve_home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".cache")
        .join("rspb")
        .join(HISTORY_FILE_NAME)
}

/// Parse a boolean-like environment flag value.
///
/// Truthy: `1`, `true`, `yes`, `on`. Falsy: `0`, `false`, `no`, `off`, empty.
/// Matching is case-insensitive and ignores surrounding whitespace.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean flag from the environment; missing or unrecognized is `false`.
pub fn env_flag_enabled(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_env_flag(&value))
        .unwrap_or(false)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            history_path: default_history_path(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            history_enabled: true,
        }
    }
}

fn parse_timeout(value: &str) -> Option<u64> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Some(secs),
        _ => {
            tracing::warn!(
                "Ignoring RSPB_TIMEOUT={:?}: expected a positive number of seconds",
                value
            );
            None
        }
    }
}

impl Config {
    /// Load configuration from `RSPB_*` environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing
    /// or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_url: env::var("RSPB_SERVER")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.server_url),
            history_path: env::var("RSPB_HISTORY_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(expand_tilde)
                .unwrap_or(defaults.history_path),
            timeout_secs: env::var("RSPB_TIMEOUT")
                .ok()
                .and_then(|t| parse_timeout(&t))
                .unwrap_or(defaults.timeout_secs),
            history_enabled: !env_flag_enabled("RSPB_NO_HISTORY"),
        }
    }
}
