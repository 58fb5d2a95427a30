//! Configuration for the activity monitor.
//!
//! There is no config file: defaults cover the normal deployment and a
//! handful of environment variables override them.

use crate::error::{MonitorError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Whether secondary URL transitions (`UrlReopened`, `UrlSwitched`) are
/// written to the Browser log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrlTransitionPolicy {
    /// Only `UrlOpened` and the aggregated session entry are written.
    #[default]
    Suppressed,
    /// Reopen and focus-switch transitions get their own entries.
    Logged,
}

/// Main configuration for the monitoring engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Directory holding the per-day, per-category log files.
    pub log_dir: PathBuf,

    /// Period of the tick timer.
    #[serde(with = "duration_millis")]
    pub poll_interval: Duration,

    /// An unchanged foreground window is re-examined at most this often.
    #[serde(with = "duration_millis")]
    pub focus_debounce: Duration,

    /// Closed URL visits older than this leave the dedup map.
    #[serde(with = "duration_millis")]
    pub visit_retention: Duration,

    /// Period of the process table snapshots behind the process watcher.
    #[serde(with = "duration_millis")]
    pub process_watch_interval: Duration,

    /// Executable names (lowercase, no extension) handled as browsers.
    pub browsers: Vec<String>,

    /// Visits whose title or URL contain one of these (any case) are
    /// tracked but never logged.
    pub suppressed_markers: Vec<String>,

    /// Log `Opened` and untracked `Closed` entries from process events.
    pub log_process_events: bool,

    pub url_transition_policy: UrlTransitionPolicy,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            poll_interval: Duration::from_secs(2),
            focus_debounce: Duration::from_secs(60),
            visit_retention: Duration::from_secs(5 * 60),
            process_watch_interval: Duration::from_secs(1),
            browsers: [
                "chrome", "firefox", "msedge", "edge", "iexplore", "opera", "brave", "safari",
                "vivaldi",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            suppressed_markers: ["CandidateWindow", "新标签页", "New Tab"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            log_process_events: true,
            url_transition_policy: UrlTransitionPolicy::default(),
        }
    }
}

impl MonitorConfig {
    /// Defaults with overrides read from the process environment.
    ///
    /// Recognised variables: `ACTMON_LOG_DIR`, `ACTMON_POLL_MS`,
    /// `ACTMON_URL_TRANSITIONS` (`logged` or `suppressed`).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults with overrides taken from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup("ACTMON_LOG_DIR").filter(|s| !s.trim().is_empty()) {
            config.log_dir = PathBuf::from(dir);
        }

        if let Some(raw) = lookup("ACTMON_POLL_MS") {
            let millis: u64 = raw.trim().parse().map_err(|_| MonitorError::Config {
                key: "ACTMON_POLL_MS",
                reason: format!("'{raw}' is not a number of milliseconds"),
            })?;
            if millis == 0 {
                return Err(MonitorError::Config {
                    key: "ACTMON_POLL_MS",
                    reason: "interval must be positive".to_string(),
                });
            }
            config.poll_interval = Duration::from_millis(millis);
        }

        if let Some(raw) = lookup("ACTMON_URL_TRANSITIONS") {
            config.url_transition_policy = match raw.trim().to_lowercase().as_str() {
                "logged" => UrlTransitionPolicy::Logged,
                "suppressed" => UrlTransitionPolicy::Suppressed,
                other => {
                    return Err(MonitorError::Config {
                        key: "ACTMON_URL_TRANSITIONS",
                        reason: format!("expected 'logged' or 'suppressed', got '{other}'"),
                    })
                }
            };
        }

        Ok(config)
    }
}

/// `Logs` next to the running binary, or relative to the working
/// directory if the executable path is unavailable.
fn default_log_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("Logs")))
        .unwrap_or_else(|| PathBuf::from("Logs"))
}

/// Serde support for Duration as whole milliseconds.
mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = MonitorConfig::default();
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.focus_debounce, Duration::from_secs(60));
        assert_eq!(config.visit_retention, Duration::from_secs(300));
        assert!(config.browsers.iter().any(|b| b == "chrome"));
        assert!(config.log_dir.ends_with("Logs"));
        assert_eq!(config.url_transition_policy, UrlTransitionPolicy::Suppressed);
    }

    #[test]
    fn test_env_overrides() {
        let config = MonitorConfig::from_lookup(lookup_from(&[
            ("ACTMON_LOG_DIR", "/tmp/actmon-logs"),
            ("ACTMON_POLL_MS", "1500"),
            ("ACTMON_URL_TRANSITIONS", "Logged"),
        ]))
        .unwrap();

        assert_eq!(config.log_dir, PathBuf::from("/tmp/actmon-logs"));
        assert_eq!(config.poll_interval, Duration::from_millis(1500));
        assert_eq!(config.url_transition_policy, UrlTransitionPolicy::Logged);
    }

    #[test]
    fn test_invalid_poll_interval_rejected() {
        let err = MonitorConfig::from_lookup(lookup_from(&[("ACTMON_POLL_MS", "fast")]))
            .unwrap_err();
        assert!(matches!(err, MonitorError::Config { key: "ACTMON_POLL_MS", .. }));

        let err =
            MonitorConfig::from_lookup(lookup_from(&[("ACTMON_POLL_MS", "0")])).unwrap_err();
        assert!(matches!(err, MonitorError::Config { .. }));
    }

    #[test]
    fn test_invalid_policy_rejected() {
        let err = MonitorConfig::from_lookup(lookup_from(&[("ACTMON_URL_TRANSITIONS", "maybe")]))
            .unwrap_err();
        assert!(matches!(err, MonitorError::Config { key: "ACTMON_URL_TRANSITIONS", .. }));
    }

    #[test]
    fn test_serialization_uses_millis() {
        let json = serde_json::to_value(MonitorConfig::default()).unwrap();
        assert_eq!(json["poll_interval"], 2000);
        assert_eq!(json["url_transition_policy"], "suppressed");
    }
}
