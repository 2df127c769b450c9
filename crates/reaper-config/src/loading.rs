use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::errors::ConfigError;
use crate::types::ReaperConfig;

/// Resolve the config file location.
///
/// `REAPER_CONFIG` wins when set and non-empty, otherwise
/// `~/.reaper/config.toml`, otherwise `./.reaper/config.toml`.
pub fn config_file_path() -> PathBuf {
    if let Ok(path_str) = std::env::var("REAPER_CONFIG")
        && !path_str.is_empty()
    {
        return PathBuf::from(path_str);
    }

    match dirs::home_dir() {
        Some(home) => home.join(".reaper").join("config.toml"),
        None => {
            tracing::warn!(
                event = "config.home_dir_not_found",
                fallback = ".",
                "Could not determine home directory - using current directory as fallback"
            );
            PathBuf::from(".").join(".reaper").join("config.toml")
        }
    }
}

/// Load the config from the default location.
///
/// A missing file is not an error: defaults apply.
pub fn load_config() -> Result<ReaperConfig, ConfigError> {
    let path = config_file_path();
    if !path.exists() {
        debug!(
            event = "config.load_skipped",
            path = %path.display(),
            reason = "file not found"
        );
        return Ok(ReaperConfig::default());
    }
    load_config_from(&path)
}

/// Load the config from an explicit path. The file must exist.
pub fn load_config_from(path: &Path) -> Result<ReaperConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::ConfigNotFound {
            path: path.display().to_string(),
        });
    }

    let content = std::fs::read_to_string(path)?;
    let config: ReaperConfig =
        toml::from_str(&content).map_err(|e| ConfigError::ConfigParseError {
            message: format!("{}: {}", path.display(), e),
        })?;
    config.validate()?;

    info!(event = "config.loaded", path = %path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_file_path_env_override() {
        let temp_dir = TempDir::new().unwrap();
        let custom = temp_dir.path().join("custom.toml");
        temp_env::with_var("REAPER_CONFIG", Some(&custom), || {
            assert_eq!(config_file_path(), custom);
        });
    }

    #[test]
    fn test_config_file_path_empty_env_uses_default() {
        temp_env::with_var("REAPER_CONFIG", Some(""), || {
            let path = config_file_path();
            assert!(path.ends_with("config.toml"));
            assert!(path.to_string_lossy().contains(".reaper"));
        });
    }

    #[test]
    fn test_load_config_missing_default_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope.toml");
        temp_env::with_var("REAPER_CONFIG", Some(&missing), || {
            let config = load_config().expect("defaults");
            assert_eq!(config, ReaperConfig::default());
        });
    }

    #[test]
    fn test_load_config_from_missing_explicit_path_fails() {
        let temp_dir = TempDir::new().unwrap();
        let err = load_config_from(&temp_dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigNotFound { .. }));
    }

    #[test]
    fn test_load_config_from_reads_sections() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[cloud]
name = "research"

[notify]
sender = "ops@example.org"
recipient = "audit@example.org"

[state]
dir = "/var/lib/reaper"
"#,
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.cloud.name.as_deref(), Some("research"));
        assert_eq!(config.notify.recipient.as_deref(), Some("audit@example.org"));
        assert_eq!(config.state.dir, Some(PathBuf::from("/var/lib/reaper")));
    }

    #[test]
    fn test_load_config_from_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[cloud\nname = ").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
    }

    #[test]
    fn test_load_config_from_runs_validation() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[notify]\nsender = \"nobody\"\n").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfiguration { .. }));
    }
}
