//! Pipeline configuration loaded from environment variables.

use std::str::FromStr;

use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(ConfigError::InvalidValue {
                key: "LOG_FORMAT",
                value: s.to_string(),
            }),
        }
    }
}

/// Runtime configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `pretty` or `json` (default: `pretty`)
/// - `AUDIT_DATABASE_URL`: PostgreSQL URL for the audit log; unset keeps it
///   in memory
/// - `AUDIT_MAX_CONNECTIONS`: pool size for the audit log (default: `5`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub log_level: String,
    pub log_format: LogFormat,
    pub audit_database_url: Option<String>,
    pub audit_max_connections: u32,
}

impl PipelineConfig {
    /// Loads configuration, falling back to the default for any missing or
    /// unparsable value.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            log_level: var("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: var("LOG_FORMAT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.log_format),
            audit_database_url: var("AUDIT_DATABASE_URL"),
            audit_max_connections: var("AUDIT_MAX_CONNECTIONS")
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.audit_max_connections),
        }
    }

    /// Loads configuration, rejecting unparsable values.
    pub fn try_from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let log_format = match var("LOG_FORMAT") {
            Some(value) => value.parse()?,
            None => defaults.log_format,
        };

        let audit_max_connections = match var("AUDIT_MAX_CONNECTIONS") {
            Some(value) => value
                .trim()
                .parse()
                .ok()
                .filter(|n: &u32| *n > 0)
                .ok_or(ConfigError::InvalidValue {
                    key: "AUDIT_MAX_CONNECTIONS",
                    value,
                })?,
            None => defaults.audit_max_connections,
        };

        Ok(Self {
            log_level: var("RUST_LOG").unwrap_or(defaults.log_level),
            log_format,
            audit_database_url: var("AUDIT_DATABASE_URL"),
            audit_max_connections,
        })
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            audit_database_url: None,
            audit_max_connections: 5,
        }
    }
}

/// Non-empty environment variable.
fn var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    const KEYS: [&str; 4] = [
        "RUST_LOG",
        "LOG_FORMAT",
        "AUDIT_DATABASE_URL",
        "AUDIT_MAX_CONNECTIONS",
    ];

    fn with_env(vars: &[(&str, &str)], test: impl FnOnce()) {
        // SAFETY: tests touching the environment run serially.
        unsafe {
            for key in KEYS {
                std::env::remove_var(key);
            }
            for (key, value) in vars {
                std::env::set_var(key, value);
            }
        }
        test();
        unsafe {
            for key in KEYS {
                std::env::remove_var(key);
            }
        }
    }

    #[test]
    fn test_default_values() {
        let config = PipelineConfig::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.audit_database_url, None);
        assert_eq!(config.audit_max_connections, 5);
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!("pretty".parse::<LogFormat>(), Ok(LogFormat::Pretty));
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    #[serial]
    fn test_from_env_reads_values() {
        with_env(
            &[
                ("RUST_LOG", "debug"),
                ("LOG_FORMAT", "json"),
                ("AUDIT_DATABASE_URL", "postgres://localhost/audit"),
                ("AUDIT_MAX_CONNECTIONS", "12"),
            ],
            || {
                let config = PipelineConfig::from_env();
                assert_eq!(config.log_level, "debug");
                assert_eq!(config.log_format, LogFormat::Json);
                assert_eq!(
                    config.audit_database_url.as_deref(),
                    Some("postgres://localhost/audit")
                );
                assert_eq!(config.audit_max_connections, 12);
                assert_eq!(PipelineConfig::try_from_env(), Ok(config));
            },
        );
    }

    #[test]
    #[serial]
    fn test_from_env_falls_back_on_invalid_values() {
        with_env(
            &[("LOG_FORMAT", "xml"), ("AUDIT_MAX_CONNECTIONS", "0")],
            || {
                let config = PipelineConfig::from_env();
                assert_eq!(config, PipelineConfig::default());
            },
        );
    }

    #[test]
    #[serial]
    fn test_try_from_env_rejects_invalid_values() {
        with_env(&[("AUDIT_MAX_CONNECTIONS", "many")], || {
            assert_eq!(
                PipelineConfig::try_from_env(),
                Err(ConfigError::InvalidValue {
                    key: "AUDIT_MAX_CONNECTIONS",
                    value: "many".to_string(),
                })
            );
        });

        with_env(&[("LOG_FORMAT", "xml")], || {
            assert!(PipelineConfig::try_from_env().is_err());
        });
    }
}
