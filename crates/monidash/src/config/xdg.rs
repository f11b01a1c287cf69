//! Platform-aware path resolution for monidash.
//!
//! On **Linux**, follows the XDG Base Directory Specification:
//! `$XDG_CONFIG_HOME/monidash` or `~/.config/monidash`.
//!
//! On **macOS**, uses Apple conventions with the XDG env var as an override:
//! `$XDG_CONFIG_HOME/monidash` or `~/Library/Application Support/monidash`.

use std::fs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "monidash";

/// Returns the configuration directory for monidash.
///
/// Resolution order:
/// 1. `$XDG_CONFIG_HOME/monidash` (if env var set, any platform)
/// 2. Platform default
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg.is_empty() {
            return PathBuf::from(xdg).join(APP_NAME);
        }
    }
    platform_config_dir().join(APP_NAME)
}

/// Platform-native config base directory (without XDG override).
///
/// Falls back to a relative `.config` when no home directory is known.
fn platform_config_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        dirs::config_dir().unwrap_or_else(|| PathBuf::from(".config"))
    }
    #[cfg(not(target_os = "macos"))]
    {
        dirs::home_dir()
            .map(|home| home.join(".config"))
            .unwrap_or_else(|| PathBuf::from(".config"))
    }
}

/// Returns the path to the main configuration file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Expands a leading `~` in a path string to the user's home directory.
///
/// Paths without a leading `~`, or when the home directory is unknown, are
/// returned as-is.
pub fn expand_tilde(path: &str) -> PathBuf {
    let home = dirs::home_dir();
    match (path.strip_prefix("~/"), home) {
        (Some(rest), Some(home)) => home.join(rest),
        (None, Some(home)) if path == "~" => home,
        _ => PathBuf::from(path),
    }
}

/// Creates a directory and all parent directories with mode 0700.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    fs::create_dir_all(path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o700))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::with_env;
    use serial_test::serial;

    #[test]
    #[serial]
    fn config_path_with_xdg_override() {
        with_env(&[("XDG_CONFIG_HOME", Some("/custom/config"))], || {
            assert_eq!(
                config_path(),
                PathBuf::from("/custom/config/monidash/config.toml")
            );
        });
    }

    #[test]
    #[serial]
    fn empty_xdg_value_is_ignored() {
        with_env(&[("XDG_CONFIG_HOME", Some(""))], || {
            assert_eq!(config_dir(), platform_config_dir().join("monidash"));
        });
    }

    #[cfg(not(target_os = "macos"))]
    #[test]
    #[serial]
    fn linux_config_default_is_dot_config() {
        with_env(&[("XDG_CONFIG_HOME", None)], || {
            let home = dirs::home_dir().expect("could not determine home directory");
            assert_eq!(config_dir(), home.join(".config/monidash"));
        });
    }

    #[test]
    fn expand_tilde_with_home_prefix() {
        let home = dirs::home_dir().expect("could not determine home directory");
        assert_eq!(expand_tilde("~/logs/monidash.log"), home.join("logs/monidash.log"));
        assert_eq!(expand_tilde("~"), home);
    }

    #[test]
    fn expand_tilde_leaves_other_paths_alone() {
        assert_eq!(expand_tilde("/var/log/x.log"), PathBuf::from("/var/log/x.log"));
        assert_eq!(expand_tilde("relative/x.log"), PathBuf::from("relative/x.log"));
        assert_eq!(expand_tilde("~user/x.log"), PathBuf::from("~user/x.log"));
    }

    #[test]
    fn ensure_dir_creates_nested_directory() {
        let tmp = tempfile::tempdir().expect("failed to create temp dir");
        let nested = tmp.path().join("a/b/c");
        ensure_dir(&nested).expect("ensure_dir failed");
        assert!(nested.is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn ensure_dir_sets_owner_only_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let tmp = tempfile::tempdir().expect("failed to create temp dir");
        let dir = tmp.path().join("secure");
        ensure_dir(&dir).expect("ensure_dir failed");
        let mode = fs::metadata(&dir)
            .expect("failed to read metadata")
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o700);
    }
}
