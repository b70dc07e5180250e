//! `robochat.toml` loading.

use robochat_client::ClientConfig;
use robochat_core::{RobochatError, RobochatResult};
use serde::Deserialize;
use std::path::Path;

/// Contents of the configuration file. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CliConfig {
    /// The `[client]` section.
    #[serde(default)]
    pub client: ClientConfig,
}

/// Read and parse a TOML config file into a [`CliConfig`].
pub fn parse_config(path: &Path) -> RobochatResult<CliConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        RobochatError::Config(format!(
            "Failed to read config '{}': {e}",
            path.display()
        ))
    })?;
    toml::from_str(&content).map_err(|e| {
        RobochatError::Config(format!(
            "Failed to parse config '{}': {e}",
            path.display()
        ))
    })
}

/// Parse `path` if given, else `default_path` if it exists, else defaults.
pub fn load(path: Option<&Path>, default_path: &Path) -> RobochatResult<CliConfig> {
    match path {
        Some(path) => parse_config(path),
        None if default_path.exists() => parse_config(default_path),
        None => {
            tracing::debug!(path = %default_path.display(), "No config file, using defaults");
            Ok(CliConfig::default())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_client_section() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            tmp.as_file_mut(),
            r#"
[client]
base_url = "http://qa.example:8000"
user_name = "amy"
poll_interval_secs = 10
"#
        )
        .unwrap();

        let config = parse_config(tmp.path()).unwrap();
        assert_eq!(config.client.base_url, "http://qa.example:8000");
        assert_eq!(config.client.user_name, "amy");
        assert_eq!(config.client.poll_interval_secs, 10);
        assert_eq!(config.client.timeout_secs, 5);
    }

    #[test]
    fn empty_file_gives_defaults() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp.as_file_mut()).unwrap();

        let config = parse_config(tmp.path()).unwrap();
        assert_eq!(config.client.user_id, 1);
        assert_eq!(config.client.submit_delay_ms, 1);
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp.as_file_mut(), "{{{{invalid toml!!!!").unwrap();
        let err = parse_config(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"), "unexpected error: {err}");
    }

    #[test]
    fn explicit_missing_file_is_error() {
        let missing = Path::new("/nonexistent/robochat.toml");
        assert!(load(Some(missing), missing).is_err());
    }

    #[test]
    fn missing_default_file_gives_defaults() {
        let missing = Path::new("/nonexistent/robochat.toml");
        let config = load(None, missing).unwrap();
        assert_eq!(config.client.base_url, "http://127.0.0.1:8000");
    }
}
