//! Configuration loader.
//!
//! Loads `AppConfig` from a TOML file, applies environment overrides, and
//! validates the result. A missing file is not an error: defaults plus the
//! environment may be a complete configuration.

use crate::config::error::{ConfigError, ConfigResult};
use crate::config::models::AppConfig;
use std::path::Path;

/// Environment variable that overrides the configured API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Loads and validates the application configuration.
///
/// # Arguments
///
/// * `path` - Location of the TOML configuration file (typically
///   `deskpilot.toml`). If the file does not exist, defaults are used.
///
/// The API key is not required here: the read-only viewer runs without
/// one. Paths that start cycles call [`AppConfig::require_api_key`] before
/// the first cycle.
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - The file exists but cannot be read or parsed
/// - The OCR confidence threshold is above 100
/// - The screenshots directory or the store's parent directory cannot be
///   created
pub fn load_config(path: &Path) -> ConfigResult<AppConfig> {
    let mut config = if path.exists() {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        AppConfig::default()
    };

    // Environment wins over the file for credentials.
    if let Ok(key) = std::env::var(API_KEY_ENV) {
        if !key.is_empty() {
            config.api_key = key;
        }
    }

    validate(&config)?;
    create_directories(&config)?;

    Ok(config)
}

fn validate(config: &AppConfig) -> ConfigResult<()> {
    if config.ocr_confidence_threshold > 100 {
        return Err(ConfigError::InvalidThreshold {
            value: config.ocr_confidence_threshold,
        });
    }

    Ok(())
}

fn create_directories(config: &AppConfig) -> ConfigResult<()> {
    std::fs::create_dir_all(&config.screenshots_dir).map_err(|source| ConfigError::CreateDir {
        path: config.screenshots_dir.clone(),
        source,
    })?;

    if let Some(parent) = config.store_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::tempdir;

    // Tests that touch OPENAI_API_KEY must not interleave.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn write_config(dir: &Path, content: &str) -> std::path::PathBuf {
        let path = dir.join("deskpilot.toml");
        fs::write(&path, content).expect("write config file");
        path
    }

    #[test]
    fn test_load_config_full_file() {
        let dir = tempdir().expect("create temp dir");
        let path = write_config(
            dir.path(),
            &format!(
                r#"
api_key = "sk-from-file"
model = "gpt-4o"
ocr_confidence_threshold = 55
auto_execute = true
screenshots_dir = "{}"
store_path = "{}"
"#,
                dir.path().join("shots").display(),
                dir.path().join("cycles.json").display()
            ),
        );

        let _guard = ENV_LOCK.lock().expect("env lock");
        std::env::remove_var(API_KEY_ENV);

        let config = load_config(&path).expect("load config");
        assert_eq!(config.api_key, "sk-from-file");
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.ocr_confidence_threshold, 55);
        assert!(config.auto_execute);
        assert!(config.screenshots_dir.is_dir());
    }

    #[test]
    fn test_missing_api_key_is_fatal_for_cycle_paths() {
        let dir = tempdir().expect("create temp dir");
        let path = write_config(dir.path(), "model = \"gpt-4o\"\n");

        let _guard = ENV_LOCK.lock().expect("env lock");
        std::env::remove_var(API_KEY_ENV);

        let config = load_config(&path).expect("load succeeds without key");
        let result = config.require_api_key();
        assert!(matches!(result, Err(ConfigError::MissingApiKey)));
    }

    #[test]
    fn test_env_overrides_file_key() {
        let dir = tempdir().expect("create temp dir");
        let path = write_config(
            dir.path(),
            &format!(
                "api_key = \"sk-from-file\"\nscreenshots_dir = \"{}\"\n",
                dir.path().join("shots").display()
            ),
        );

        let _guard = ENV_LOCK.lock().expect("env lock");
        std::env::set_var(API_KEY_ENV, "sk-from-env");
        let config = load_config(&path).expect("load config");
        std::env::remove_var(API_KEY_ENV);

        assert_eq!(config.api_key, "sk-from-env");
    }

    #[test]
    fn test_threshold_out_of_range_rejected() {
        let dir = tempdir().expect("create temp dir");
        let path = write_config(
            dir.path(),
            "api_key = \"sk-test\"\nocr_confidence_threshold = 101\n",
        );

        let result = load_config(&path);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidThreshold { value: 101 })
        ));
    }

    #[test]
    fn test_invalid_toml_reported_with_path() {
        let dir = tempdir().expect("create temp dir");
        let path = write_config(dir.path(), "api_key = [not toml");

        let result = load_config(&path);
        assert!(matches!(result, Err(ConfigError::TomlParse { .. })));
    }
}
