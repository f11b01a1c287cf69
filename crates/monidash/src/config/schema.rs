//! TOML configuration schema types.
//!
//! All structs derive `Deserialize` and `Serialize` with defaults via
//! `#[serde(default)]`, so a partial or empty file is valid and unknown keys
//! are ignored.
//!
//! Duration fields use human-readable strings (e.g. `"0ms"`, `"2s"`) parsed by
//! the `humantime` crate when converted into runtime settings.

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;
use crate::dashboard::{DashboardConfig, DEFAULT_MIN_BOX_SIZE, DEFAULT_PADDING};
use crate::fetcher::FetcherConfig;
use crate::geometry::Size;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root configuration encompassing all sections.
///
/// ```toml
/// [server]
/// [fetcher]
/// [dashboard]
/// [log]
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Where the build server lives.
    pub server: ServerConfig,
    /// Read loop tuning.
    pub fetcher: FetcherSection,
    /// Grid geometry.
    pub dashboard: DashboardSection,
    /// Log filter and destination.
    pub log: LogConfig,
}

impl Config {
    /// Configured server address, or `None` when left empty.
    pub fn server_address(&self) -> Option<&str> {
        let address = self.server.address.trim();
        (!address.is_empty()).then_some(address)
    }

    /// Converts the `[fetcher]` section into runtime settings.
    pub fn fetcher_config(&self) -> Result<FetcherConfig, ConfigError> {
        let network_retry_delay = humantime::parse_duration(&self.fetcher.network_retry_delay)
            .map_err(|e| ConfigError::InvalidValue {
                field: "fetcher.network_retry_delay",
                message: e.to_string(),
            })?;
        Ok(FetcherConfig {
            network_retry_delay,
        })
    }

    /// Converts the `[dashboard]` section into runtime settings.
    pub fn dashboard_config(&self) -> DashboardConfig {
        DashboardConfig {
            min_box_size: Size::new(
                self.dashboard.min_box_width,
                self.dashboard.min_box_height,
            ),
            padding: self.dashboard.padding,
        }
    }

    /// Checks every field that `serde` cannot check on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.fetcher_config()?;
        if self.dashboard.min_box_width == 0 || self.dashboard.min_box_height == 0 {
            return Err(ConfigError::InvalidValue {
                field: "dashboard.min_box_width",
                message: "minimum box size must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

/// Build server connection.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// `host:port` of the build server. Overridden by `--address` and
    /// `MONIDASH_ADDR`.
    pub address: String,
}

// ---------------------------------------------------------------------------
// Fetcher
// ---------------------------------------------------------------------------

/// `[fetcher]` table.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct FetcherSection {
    /// Pause after a network error before reading again (e.g. `"500ms"`).
    /// `"0ms"` reads again immediately.
    pub network_retry_delay: String,
}

impl Default for FetcherSection {
    fn default() -> Self {
        Self {
            network_retry_delay: "0ms".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// `[dashboard]` table.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DashboardSection {
    pub min_box_width: u16,
    pub min_box_height: u16,
    pub padding: u16,
}

impl Default for DashboardSection {
    fn default() -> Self {
        Self {
            min_box_width: DEFAULT_MIN_BOX_SIZE.width,
            min_box_height: DEFAULT_MIN_BOX_SIZE.height,
            padding: DEFAULT_PADDING,
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// `[log]` table.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    /// Verbosity when `MONIDASH_LOG` is unset.
    pub level: LogLevel,
    /// Log file path. Empty string discards log output.
    pub file: String,
}

/// Log verbosity levels (kebab-case in TOML).
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LogLevel {
    /// Only errors.
    Error,
    /// Errors and warnings (default).
    #[default]
    Warn,
    /// Informational messages.
    Info,
    /// Debug-level detail.
    Debug,
    /// Full trace output.
    Trace,
}

impl LogLevel {
    /// The level as a tracing filter directive.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn parse_valid_config_all_fields() {
        let toml_str = r#"
[server]
address = "ci.example.com:4000"

[fetcher]
network_retry_delay = "250ms"

[dashboard]
min_box_width = 40
min_box_height = 6
padding = 2

[log]
level = "debug"
file = "/var/log/monidash.log"
"#;
        let config: Config = toml::from_str(toml_str).expect("valid TOML should parse");
        assert_eq!(config.server_address(), Some("ci.example.com:4000"));
        assert_eq!(
            config.fetcher_config().expect("valid duration"),
            FetcherConfig {
                network_retry_delay: Duration::from_millis(250)
            }
        );
        assert_eq!(
            config.dashboard_config(),
            DashboardConfig {
                min_box_size: Size::new(40, 6),
                padding: 2,
            }
        );
        assert_eq!(config.log.level, LogLevel::Debug);
        assert_eq!(config.log.file, "/var/log/monidash.log");
    }

    #[test]
    fn parse_empty_string_uses_all_defaults() {
        let config: Config = toml::from_str("").expect("empty string should parse");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn parse_unknown_fields_are_ignored() {
        let toml_str = r#"
unknown_key = "hello"

[dashboard]
future_field = 42
"#;
        let config: Config = toml::from_str(toml_str).expect("unknown fields should be ignored");
        assert_eq!(config.dashboard, DashboardSection::default());
    }

    #[test]
    fn defaults_match_runtime_defaults() {
        let config = Config::default();
        assert_eq!(config.server_address(), None);
        assert_eq!(
            config.fetcher_config().expect("default is valid"),
            FetcherConfig::default()
        );
        assert_eq!(config.dashboard_config(), DashboardConfig::default());
        assert_eq!(config.log.level, LogLevel::Warn);
        assert!(config.log.file.is_empty());
    }

    #[test]
    fn blank_address_counts_as_unset() {
        let mut config = Config::default();
        config.server.address = "   ".to_string();
        assert_eq!(config.server_address(), None);
    }

    #[test]
    fn bad_retry_delay_is_invalid_value() {
        let mut config = Config::default();
        config.fetcher.network_retry_delay = "soon".to_string();
        match config.fetcher_config() {
            Err(ConfigError::InvalidValue { field, .. }) => {
                assert_eq!(field, "fetcher.network_retry_delay");
            }
            other => panic!("expected InvalidValue, got: {other:?}"),
        }
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_box_size_fails_validation() {
        let mut config = Config::default();
        config.dashboard.min_box_height = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn log_level_all_variants() {
        for (input, expected) in [
            ("error", LogLevel::Error),
            ("warn", LogLevel::Warn),
            ("info", LogLevel::Info),
            ("debug", LogLevel::Debug),
            ("trace", LogLevel::Trace),
        ] {
            let toml_str = format!("[log]\nlevel = \"{input}\"\n");
            let config: Config = toml::from_str(&toml_str).expect("valid level");
            assert_eq!(config.log.level, expected);
            assert_eq!(expected.as_str(), input);
        }
    }

    #[test]
    fn invalid_log_level_returns_error() {
        let result: Result<Config, _> = toml::from_str("[log]\nlevel = \"loud\"\n");
        assert!(result.is_err());
    }
}
