//! Default configuration template and file creation.
//!
//! Provides a commented TOML template that matches `Config::default()` and a
//! function to write it to disk.

use std::fs;
use std::path::Path;

use crate::config::error::ConfigError;
use crate::config::xdg;

// ---------------------------------------------------------------------------
// Default TOML template
// ---------------------------------------------------------------------------

/// A commented TOML template with all default values.
///
/// Every value here must match `Config::default()` from `schema.rs`.
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# Monidash Configuration
#
# This file was generated with the built-in defaults.
# Edit values to customize the dashboard.
#
# Location: $XDG_CONFIG_HOME/monidash/config.toml

# ==============================================================================
# Build Server
# ==============================================================================

[server]

# Address of the build status server as host:port.
# The --address flag and the MONIDASH_ADDR environment variable take
# precedence over this value.
# Example: "ci.example.com:4000"
address = ""

# ==============================================================================
# Fetcher
# ==============================================================================

[fetcher]

# Pause after a network error before reading from the socket again.
# "0ms" retries immediately.
# Examples: "0ms", "500ms", "2s"
network_retry_delay = "0ms"

# ==============================================================================
# Dashboard
# ==============================================================================

[dashboard]

# Smallest box, in terminal cells, a build is drawn in.
# Boxes are stretched horizontally to fill their column.
min_box_width = 30
min_box_height = 5

# Cells between boxes and around the grid.
padding = 1

# ==============================================================================
# Logging
# ==============================================================================

[log]

# Logging verbosity, used when MONIDASH_LOG is not set.
# Options: "error", "warn", "info", "debug", "trace"
level = "warn"

# Path to the log file. The dashboard owns the terminal, so an empty
# string discards log output.
# Example: "~/.local/state/monidash/monidash.log"
file = ""
"#;

// ---------------------------------------------------------------------------
// File creation
// ---------------------------------------------------------------------------

/// Writes the default template to `path`.
///
/// - If the file exists and `force` is `false`, returns `ConfigError::AlreadyExists`.
/// - If the file exists and `force` is `true`, backs it up to `.toml.backup` first.
pub fn create_default_config(path: &Path, force: bool) -> Result<(), ConfigError> {
    if path.exists() {
        if !force {
            return Err(ConfigError::AlreadyExists {
                path: path.to_path_buf(),
            });
        }
        let backup_path = path.with_extension("toml.backup");
        fs::rename(path, &backup_path).map_err(|e| ConfigError::WriteError {
            path: backup_path.clone(),
            source: e,
        })?;
        tracing::info!("Backed up existing config to {}", backup_path.display());
    }

    write_default_config(path)?;
    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}

/// Writes the template, creating a missing parent dir and setting 0600 permissions.
fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let write_error = |source| ConfigError::WriteError {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            xdg::ensure_dir(parent).map_err(write_error)?;
        }
    }

    fs::write(path, DEFAULT_CONFIG_TEMPLATE).map_err(write_error)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(write_error)?;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::Config;

    // -- Template validity --------------------------------------------------

    #[test]
    fn template_values_match_config_default() {
        let from_template: Config =
            toml::from_str(DEFAULT_CONFIG_TEMPLATE).expect("template should parse");
        assert_eq!(from_template, Config::default());
    }

    #[test]
    fn template_contains_all_section_headers() {
        for section in ["[server]", "[fetcher]", "[dashboard]", "[log]"] {
            assert!(
                DEFAULT_CONFIG_TEMPLATE.contains(section),
                "missing {section} section"
            );
        }
    }

    // -- create_default_config ----------------------------------------------

    #[test]
    fn creates_file_and_parent_directory() {
        let tmp = tempfile::tempdir().expect("failed to create temp dir");
        let path = tmp.path().join("monidash/config.toml");

        create_default_config(&path, false).expect("should succeed");

        let content = fs::read_to_string(&path).expect("should read");
        assert_eq!(content, DEFAULT_CONFIG_TEMPLATE);
    }

    #[test]
    fn existing_file_without_force_is_already_exists() {
        let tmp = tempfile::tempdir().expect("failed to create temp dir");
        let path = tmp.path().join("config.toml");
        fs::write(&path, "# mine\n").expect("write initial config");

        let err = create_default_config(&path, false).expect_err("should fail");
        assert!(matches!(err, ConfigError::AlreadyExists { .. }));
        assert_eq!(fs::read_to_string(&path).expect("read"), "# mine\n");
    }

    #[test]
    fn force_backs_up_existing_file() {
        let tmp = tempfile::tempdir().expect("failed to create temp dir");
        let path = tmp.path().join("config.toml");
        fs::write(&path, "# custom content\n").expect("write initial config");

        create_default_config(&path, true).expect("force should succeed");

        let backup = path.with_extension("toml.backup");
        assert_eq!(
            fs::read_to_string(&backup).expect("read backup"),
            "# custom content\n"
        );
        assert_eq!(
            fs::read_to_string(&path).expect("read new"),
            DEFAULT_CONFIG_TEMPLATE
        );
    }

    #[cfg(unix)]
    #[test]
    fn file_permissions_are_0600() {
        use std::os::unix::fs::PermissionsExt;
        let tmp = tempfile::tempdir().expect("failed to create temp dir");
        let path = tmp.path().join("config.toml");

        create_default_config(&path, false).expect("should succeed");

        let mode = fs::metadata(&path).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o600, "file should be owner-only read/write");
    }
}
