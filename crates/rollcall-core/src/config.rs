//! Application configuration management.
//!
//! Handles loading, saving, and validating rollcall configuration including:
//! - HTTP bind address
//! - Frontend base URL (the origin baked into check-in URLs)
//! - Check-in tunables (acquisition timeout, range thresholds)
//! - Display timezone for exports

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::checkin::CheckInParams;
use crate::geo::{DEFAULT_CHECK_IN_RANGE_KM, DEFAULT_PREFILTER_RANGE_KM};
use crate::location::AcquireOptions;

/// Environment variable overriding the frontend base URL.
///
/// The base URL is the `origin` of every issued check-in URL, so it must
/// match wherever the frontend is actually served in each environment.
pub const FRONTEND_URL_ENV: &str = "ROLLCALL_FRONTEND_URL";

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex compiles"));

/// Loose email shape check for walk-up check-in input.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Configuration-specific error type.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file does not exist.
    #[error("Configuration file not found at: {}", .0.display())]
    NotFound(PathBuf),

    /// The file could not be read.
    #[error("Failed to read {}: {source}", .path.display())]
    ReadError {
        /// File path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file could not be written.
    #[error("Failed to write {}: {source}", .path.display())]
    WriteError {
        /// File path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid TOML for this schema.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// The configuration could not be serialized.
    #[error("Failed to serialize configuration: {0}")]
    SerializeError(String),

    /// A field holds an invalid value.
    #[error("Invalid configuration for {field}: {message}")]
    ValidationError {
        /// The offending field, dotted-path style.
        field: String,
        /// What is wrong with it.
        message: String,
    },
}

/// A specialized result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RollcallConfig {
    /// HTTP server settings.
    pub server: ServerConfig,

    /// Frontend settings.
    pub frontend: FrontendConfig,

    /// Check-in protocol tunables.
    pub checkin: CheckInSettings,

    /// System-wide settings.
    pub system: SystemConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,

    /// Bind port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
        }
    }
}

/// Frontend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontendConfig {
    /// Base URL of the frontend, used as the origin of issued check-in URLs
    /// and as the allowed CORS origin.
    pub base_url: String,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5173".to_string(),
        }
    }
}

/// Check-in protocol tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckInSettings {
    /// Location acquisition budget in seconds.
    pub location_timeout_secs: u64,

    /// Range in kilometers beyond which a check-in gets an out-of-range
    /// warning.
    pub range_km: f64,

    /// Tighter range used by silent pre-filters. A separate knob from
    /// `range_km` on purpose; the two serve different call sites.
    pub prefilter_range_km: f64,
}

impl Default for CheckInSettings {
    fn default() -> Self {
        Self {
            location_timeout_secs: 15,
            range_km: DEFAULT_CHECK_IN_RANGE_KM,
            prefilter_range_km: DEFAULT_PREFILTER_RANGE_KM,
        }
    }
}

/// System-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Timezone used when rendering export timestamps and file names.
    #[serde(with = "timezone_serde")]
    pub timezone: Tz,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::UTC,
        }
    }
}

impl RollcallConfig {
    /// The platform configuration file path.
    ///
    /// On Linux servers: `/etc/rollcall/config.toml`.
    /// Elsewhere: the platform config dir via `directories`.
    #[must_use]
    pub fn default_path() -> PathBuf {
        #[cfg(target_os = "linux")]
        {
            PathBuf::from("/etc/rollcall/config.toml")
        }
        #[cfg(not(target_os = "linux"))]
        {
            directories::ProjectDirs::from("", "", "rollcall")
                .map(|dirs| dirs.config_dir().join("config.toml"))
                .unwrap_or_else(|| PathBuf::from("./rollcall.toml"))
        }
    }

    /// Load from `path`, falling back to defaults when the file is absent.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read, parsed, or
    /// validated.
    pub fn load_or_default(path: &Path) -> ConfigResult<Self> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|source| {
                ConfigError::ReadError {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides ([`FRONTEND_URL_ENV`]).
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(FRONTEND_URL_ENV) {
            if !url.trim().is_empty() {
                self.frontend.base_url = url;
            }
        }
    }

    /// Save to `path`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization or the write fails.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::WriteError {
                path: path.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, content).map_err(|source| ConfigError::WriteError {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check every field for sanity.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError::ValidationError`] found.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError {
                field: "server.port".to_string(),
                message: "port must be non-zero".to_string(),
            });
        }
        let base_url = self.frontend.base_url.trim();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::ValidationError {
                field: "frontend.base_url".to_string(),
                message: format!("'{base_url}' must start with http:// or https://"),
            });
        }
        if self.checkin.location_timeout_secs == 0 {
            return Err(ConfigError::ValidationError {
                field: "checkin.location_timeout_secs".to_string(),
                message: "timeout must be at least one second".to_string(),
            });
        }
        if self.checkin.range_km <= 0.0 {
            return Err(ConfigError::ValidationError {
                field: "checkin.range_km".to_string(),
                message: "range must be positive".to_string(),
            });
        }
        if self.checkin.prefilter_range_km <= 0.0 {
            return Err(ConfigError::ValidationError {
                field: "checkin.prefilter_range_km".to_string(),
                message: "range must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// The location acquisition budget as a [`Duration`].
    #[must_use]
    pub fn location_timeout(&self) -> Duration {
        Duration::from_secs(self.checkin.location_timeout_secs)
    }

    /// Check-in protocol parameters derived from this configuration.
    #[must_use]
    pub fn check_in_params(&self) -> CheckInParams {
        CheckInParams {
            acquire: AcquireOptions {
                timeout: self.location_timeout(),
            },
            range_km: self.checkin.range_km,
        }
    }
}

mod timezone_serde {
    use chrono_tz::Tz;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(tz: &Tz, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(tz.name())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Tz, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = RollcallConfig::default();
        config.validate().unwrap();
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.frontend.base_url, "http://localhost:5173");
        assert_eq!(config.checkin.location_timeout_secs, 15);
        assert!((config.checkin.range_km - 1.0).abs() < f64::EPSILON);
        assert!((config.checkin.prefilter_range_km - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = RollcallConfig::default();
        config.frontend.base_url = "https://app.example.com".to_string();
        config.checkin.range_km = 2.5;
        config.system.timezone = chrono_tz::America::Los_Angeles;
        config.save_to(&path).unwrap();

        let loaded = RollcallConfig::load_or_default(&path).unwrap();
        assert_eq!(loaded.frontend.base_url, "https://app.example.com");
        assert!((loaded.checkin.range_km - 2.5).abs() < f64::EPSILON);
        assert_eq!(loaded.system.timezone, chrono_tz::America::Los_Angeles);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = RollcallConfig::load_or_default(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(config.server.port, RollcallConfig::default().server.port);
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = 8080\n").unwrap();

        let config = RollcallConfig::load_or_default(&path).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.checkin.location_timeout_secs, 15);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = RollcallConfig::default();
        config.frontend.base_url = "ftp://example.com".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError { field, .. }) if field == "frontend.base_url"
        ));

        let mut config = RollcallConfig::default();
        config.checkin.range_km = 0.0;
        assert!(config.validate().is_err());

        let mut config = RollcallConfig::default();
        config.checkin.location_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_check_in_params_derivation() {
        let mut config = RollcallConfig::default();
        config.checkin.location_timeout_secs = 30;
        config.checkin.range_km = 0.75;

        let params = config.check_in_params();
        assert_eq!(params.acquire.timeout, Duration::from_secs(30));
        assert!((params.range_km - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_email_shape_check() {
        assert!(is_valid_email("john.smith@example.com"));
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email("spaces in@example.com"));
        assert!(!is_valid_email("missing@tld"));
    }
}
