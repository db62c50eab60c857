//! Installer configuration model.
//!
//! Every field has a built-in default, so a configuration file only needs
//! to name what it changes.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{ClaraError, Result};

/// Root configuration for an installer run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerConfig {
    /// Container runtime binary used for the availability probe.
    pub runtime_binary: String,
    /// Program and leading arguments of the compose CLI.
    pub compose_command: Vec<String>,
    /// Compose file passed with `-f`, if not the default in the working directory.
    pub compose_file: Option<PathBuf>,
    /// Vendor diagnostic used for accelerator detection.
    pub accelerator_command: String,
    /// Text the diagnostic output must contain.
    pub accelerator_marker: String,
    /// Timeout for captured checks, in seconds.
    pub quick_timeout_secs: u64,
    /// Timeout for streamed pull/start operations, in seconds.
    pub long_timeout_secs: u64,
    /// Health rounds before giving up.
    pub health_max_attempts: u32,
    /// Pause between health rounds, in seconds.
    pub health_interval_secs: u64,
    /// Timeout of a single health request, in seconds.
    pub health_request_timeout_secs: u64,
    /// Host the health checks are sent to.
    pub health_host: String,
    /// Whether to offer opening the first service in a browser.
    pub open_browser: bool,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            runtime_binary: constants::RUNTIME_BINARY.into(),
            compose_command: vec![
                constants::RUNTIME_BINARY.into(),
                constants::COMPOSE_SUBCOMMAND.into(),
            ],
            compose_file: None,
            accelerator_command: constants::ACCELERATOR_COMMAND.into(),
            accelerator_marker: constants::ACCELERATOR_MARKER.into(),
            quick_timeout_secs: constants::QUICK_COMMAND_TIMEOUT_SECS,
            long_timeout_secs: constants::LONG_COMMAND_TIMEOUT_SECS,
            health_max_attempts: constants::HEALTH_MAX_ATTEMPTS,
            health_interval_secs: constants::HEALTH_INTERVAL_SECS,
            health_request_timeout_secs: constants::HEALTH_REQUEST_TIMEOUT_SECS,
            health_host: constants::HEALTH_HOST.into(),
            open_browser: true,
        }
    }
}

impl InstallerConfig {
    /// Reads a JSON configuration file. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// fails validation.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ClaraError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the values can drive a run.
    ///
    /// # Errors
    ///
    /// Returns `ClaraError::Config` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: &str| {
            Err(ClaraError::Config {
                message: message.into(),
            })
        };
        if self.compose_command.is_empty() {
            return invalid("compose_command must name a program");
        }
        if self.runtime_binary.is_empty() {
            return invalid("runtime_binary must not be empty");
        }
        if self.health_max_attempts == 0 {
            return invalid("health_max_attempts must be at least 1");
        }
        if self.quick_timeout_secs == 0 || self.long_timeout_secs == 0 {
            return invalid("command timeouts must be at least 1 second");
        }
        if self.health_request_timeout_secs == 0 {
            return invalid("health_request_timeout_secs must be at least 1 second");
        }
        Ok(())
    }

    /// Timeout for captured checks.
    #[must_use]
    pub const fn quick_timeout(&self) -> Duration {
        Duration::from_secs(self.quick_timeout_secs)
    }

    /// Timeout for streamed pull/start operations.
    #[must_use]
    pub const fn long_timeout(&self) -> Duration {
        Duration::from_secs(self.long_timeout_secs)
    }

    /// Pause between health rounds.
    #[must_use]
    pub const fn health_interval(&self) -> Duration {
        Duration::from_secs(self.health_interval_secs)
    }

    /// Timeout of a single health request.
    #[must_use]
    pub const fn health_request_timeout(&self) -> Duration {
        Duration::from_secs(self.health_request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_match_installer_constants() {
        let config = InstallerConfig::default();
        assert_eq!(config.compose_command, vec!["docker", "compose"]);
        assert_eq!(config.health_max_attempts, 24);
        assert_eq!(config.health_interval(), Duration::from_secs(5));
        assert_eq!(config.quick_timeout(), Duration::from_secs(30));
        assert_eq!(config.long_timeout(), Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_fills_missing_fields_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "health_max_attempts": 3, "open_browser": false }}"#).unwrap();

        let config = InstallerConfig::load(file.path()).unwrap();
        assert_eq!(config.health_max_attempts, 3);
        assert!(!config.open_browser);
        assert_eq!(config.runtime_binary, "docker");
    }

    #[test]
    fn load_rejects_zero_attempts() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "health_max_attempts": 0 }}"#).unwrap();

        let err = InstallerConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ClaraError::Config { .. }));
    }

    #[test]
    fn load_reports_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = InstallerConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ClaraError::Serialization { .. }));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = InstallerConfig::load(Path::new("/nonexistent/clara.json")).unwrap_err();
        assert!(matches!(err, ClaraError::Io { .. }));
    }

    #[test]
    fn empty_compose_command_is_invalid() {
        let config = InstallerConfig {
            compose_command: Vec::new(),
            ..InstallerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
