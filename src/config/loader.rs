//! Configuration loading from disk and from raw blobs.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{PolicyDocument, SchedulerConfig, WindowConfig};
use crate::config::validation::{validate_config, ValidationError};
use crate::window::WindowError;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid rollout policy: {}", join(.0))]
    Policy(Vec<WindowError>),

    #[error("validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join<T: std::fmt::Display>(errors: &[T]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Encoding of a raw policy blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyFormat {
    /// A JSON array of window objects.
    Json,
    /// A TOML document with `[[windows]]` tables.
    Toml,
}

impl PolicyFormat {
    /// Pick the format from a file extension. Anything but `.json` is TOML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => PolicyFormat::Json,
            _ => PolicyFormat::Toml,
        }
    }
}

/// Decode a raw policy blob into window entries without validating them.
pub fn decode_policy(blob: &str, format: PolicyFormat) -> Result<Vec<WindowConfig>, ConfigError> {
    match format {
        PolicyFormat::Json => Ok(serde_json::from_str(blob)?),
        PolicyFormat::Toml => Ok(toml::from_str::<PolicyDocument>(blob)?.windows),
    }
}

/// Read and decode a policy file.
pub fn load_policy(path: &Path) -> Result<Vec<WindowConfig>, ConfigError> {
    let content = fs::read_to_string(path)?;
    decode_policy(&content, PolicyFormat::from_path(path))
}

/// Load and validate scheduler settings from a TOML file.
pub fn load_config(path: &Path) -> Result<SchedulerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: SchedulerConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_format_from_path() {
        assert_eq!(PolicyFormat::from_path(Path::new("a/b.json")), PolicyFormat::Json);
        assert_eq!(PolicyFormat::from_path(Path::new("policy.JSON")), PolicyFormat::Json);
        assert_eq!(PolicyFormat::from_path(Path::new("policy.toml")), PolicyFormat::Toml);
        assert_eq!(PolicyFormat::from_path(Path::new("policy")), PolicyFormat::Toml);
    }

    #[test]
    fn test_decode_policy_both_formats() {
        let json = r#"[{"rate": "10/hour", "days": ["mon"]}]"#;
        let toml = "[[windows]]\nrate = \"10/hour\"\ndays = [\"mon\"]\n";

        let from_json = decode_policy(json, PolicyFormat::Json).unwrap();
        let from_toml = decode_policy(toml, PolicyFormat::Toml).unwrap();
        assert_eq!(from_json, from_toml);
    }

    #[test]
    fn test_decode_errors() {
        assert!(matches!(
            decode_policy("{not json", PolicyFormat::Json),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            decode_policy("windows = 3", PolicyFormat::Toml),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_load_policy_from_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"[{{"rate": "blocked", "start": "22:00", "end": "06:00"}}]"#).unwrap();

        let policy = load_policy(file.path()).unwrap();
        assert_eq!(policy, vec![WindowConfig::new("blocked").start("22:00").end("06:00")]);
    }

    #[test]
    fn test_load_config_validates() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[watch]\npoll_interval_secs = 0").unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert!(err.to_string().contains("watch.poll_interval_secs"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_policy(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
