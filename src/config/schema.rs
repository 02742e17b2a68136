//! Configuration schema definitions.
//!
//! Two documents are described here:
//! - the rollout policy (`WindowConfig` entries) delivered by the site
//!   configuration source and hot-reloaded at runtime
//! - the scheduler's own settings (`SchedulerConfig`) read once at startup
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// One raw rollout window as written by an operator.
///
/// Fields stay as strings so that the applied policy can be compared
/// structurally against the next delivery before anything is parsed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WindowConfig {
    /// `"unlimited"`, `"blocked"`/`"0"` or `"<N>/<unit>"`.
    pub rate: String,

    /// Weekday names. Empty means every day.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub days: Vec<String>,

    /// Start of the window, `HH:MM` UTC.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,

    /// End of the window (exclusive), `HH:MM` UTC.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

impl WindowConfig {
    /// A window with the given rate and no day or time restriction.
    pub fn new(rate: impl Into<String>) -> Self {
        Self {
            rate: rate.into(),
            days: Vec::new(),
            start: None,
            end: None,
        }
    }

    pub fn days<I, S>(mut self, days: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.days = days.into_iter().map(Into::into).collect();
        self
    }

    pub fn start(mut self, start: impl Into<String>) -> Self {
        self.start = Some(start.into());
        self
    }

    pub fn end(mut self, end: impl Into<String>) -> Self {
        self.end = Some(end.into());
        self
    }
}

/// TOML form of a rollout policy: a list of `[[windows]]` tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PolicyDocument {
    pub windows: Vec<WindowConfig>,
}

/// Root configuration for the scheduler process.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Where the rollout policy lives.
    pub policy: PolicySourceConfig,

    /// Hot reload settings.
    pub watch: WatchConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Location of the rollout policy file.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PolicySourceConfig {
    /// Path to a `.json` or `.toml` policy file.
    pub path: String,
}

impl Default for PolicySourceConfig {
    fn default() -> Self {
        Self {
            path: "rollout-windows.toml".to_string(),
        }
    }
}

/// Policy file watching.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Reload the policy when the file changes.
    pub enabled: bool,

    /// Poll interval for backends that cannot use native events, in seconds.
    pub poll_interval_secs: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval_secs: 2,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_config_from_json() {
        let raw = r#"[
            {"rate": "unlimited"},
            {"rate": "5/hour", "days": ["saturday", "sunday"]},
            {"rate": "blocked", "start": "22:00", "end": "06:00"}
        ]"#;
        let windows: Vec<WindowConfig> = serde_json::from_str(raw).unwrap();
        assert_eq!(windows.len(), 3);
        assert_eq!(windows[1], WindowConfig::new("5/hour").days(["saturday", "sunday"]));
        assert_eq!(windows[2], WindowConfig::new("blocked").start("22:00").end("06:00"));
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let raw = r#"[{"rate": "unlimited", "stat": "09:00"}]"#;
        assert!(serde_json::from_str::<Vec<WindowConfig>>(raw).is_err());
    }

    #[test]
    fn test_policy_document_from_toml() {
        let raw = r#"
            [[windows]]
            rate = "10/hour"

            [[windows]]
            rate = "blocked"
            days = ["sat", "sun"]
        "#;
        let doc: PolicyDocument = toml::from_str(raw).unwrap();
        assert_eq!(doc.windows.len(), 2);
        assert_eq!(doc.windows[1].days, vec!["sat", "sun"]);

        let empty: PolicyDocument = toml::from_str("").unwrap();
        assert!(empty.windows.is_empty());
    }

    #[test]
    fn test_scheduler_config_defaults() {
        let config: SchedulerConfig = toml::from_str("[watch]\nenabled = false\n").unwrap();
        assert!(!config.watch.enabled);
        assert_eq!(config.watch.poll_interval_secs, 2);
        assert_eq!(config.observability.log_level, "info");
        assert_eq!(config.policy.path, "rollout-windows.toml");
    }
}
