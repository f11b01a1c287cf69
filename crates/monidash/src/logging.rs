//! Logging initialization.
//!
//! Configures the `tracing` subscriber with level filtering via the
//! `MONIDASH_LOG` environment variable, falling back to the `[log] level`
//! config value. The dashboard owns the terminal, so output only goes to a
//! log file; without one, no subscriber is installed and events are dropped.
//!
//! ```bash
//! MONIDASH_LOG=monidash::fetcher=debug,warn monidash --address ci:4000
//! ```

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::schema::LogLevel;

/// Environment variable holding filter directives.
pub const LOG_ENV: &str = "MONIDASH_LOG";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to open log file {path}: {source}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to install log subscriber: {0}")]
    Install(String),
}

/// Builds the filter from `MONIDASH_LOG`, or from `level` when the variable
/// is unset or invalid.
pub fn build_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level.as_str()))
}

/// Installs the global subscriber writing to `file` in append mode.
///
/// With `file == None` nothing is installed. Fails if the file cannot be
/// opened or a global subscriber is already set.
pub fn init(level: LogLevel, file: Option<&Path>) -> Result<(), LoggingError> {
    let Some(path) = file else {
        return Ok(());
    };

    let writer = open_log_file(path)?;
    fmt()
        .with_env_filter(build_filter(level))
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(writer))
        .try_init()
        .map_err(|e| LoggingError::Install(e.to_string()))
}

fn open_log_file(path: &Path) -> Result<File, LoggingError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LoggingError::OpenFile {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::with_env;
    use serial_test::serial;

    #[test]
    fn env_filter_parses_level_directives() {
        for level in [
            LogLevel::Error,
            LogLevel::Warn,
            LogLevel::Info,
            LogLevel::Debug,
            LogLevel::Trace,
        ] {
            assert!(
                EnvFilter::try_new(level.as_str()).is_ok(),
                "failed to parse directive: {}",
                level.as_str()
            );
        }
    }

    #[test]
    fn env_filter_parses_module_directive() {
        assert!(EnvFilter::try_new("monidash::fetcher=debug,warn").is_ok());
    }

    #[test]
    #[serial]
    fn config_level_used_when_env_unset() {
        with_env(&[(LOG_ENV, None)], || {
            assert_eq!(build_filter(LogLevel::Info).to_string(), "info");
        });
    }

    #[test]
    #[serial]
    fn env_overrides_config_level() {
        with_env(&[(LOG_ENV, Some("debug"))], || {
            assert_eq!(build_filter(LogLevel::Error).to_string(), "debug");
        });
    }

    #[test]
    fn no_file_installs_nothing() {
        assert!(init(LogLevel::Trace, None).is_ok());
    }

    #[test]
    fn open_log_file_appends() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = dir.path().join("monidash.log");
        std::fs::write(&path, "earlier\n").expect("seed log");

        {
            use std::io::Write;
            let mut file = open_log_file(&path).expect("should open");
            file.write_all(b"later\n").expect("write");
        }

        assert_eq!(
            std::fs::read_to_string(&path).expect("read"),
            "earlier\nlater\n"
        );
    }

    #[test]
    fn unopenable_log_file_is_reported() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = dir.path().join("missing/dir/monidash.log");
        match init(LogLevel::Warn, Some(&path)) {
            Err(LoggingError::OpenFile { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected OpenFile, got: {other:?}"),
        }
    }
}
