//! Configuration loading and merging logic.
//!
//! Missing config files are expected and skipped; unreadable or malformed
//! files are errors so a typo never silently falls back to defaults.

use crate::config::defaults::CONFIG_DIR_NAME;
use crate::config::types::{ExportConfig, GhostdashConfig, PollingConfig, RemoteConfig};
use crate::config::validation::validate_config;
use crate::errors::ConfigError;
use std::fs;
use std::path::{Path, PathBuf};

/// Load configuration from the hierarchy of config files.
///
/// Loads and merges configuration from:
/// 1. Default values
/// 2. User config (`~/.ghostdash/config.toml`)
/// 3. Project config (`./.ghostdash/config.toml`)
///
/// # Errors
///
/// Returns an error if a present file cannot be parsed or validation fails.
pub fn load_hierarchy() -> Result<GhostdashConfig, ConfigError> {
    let mut config = GhostdashConfig::default();

    if let Some(home_dir) = dirs::home_dir() {
        let user_path = home_dir.join(CONFIG_DIR_NAME).join("config.toml");
        if let Some(user_config) = load_optional_config_file(&user_path)? {
            config = merge_configs(config, user_config);
        }
    }

    let project_path = std::env::current_dir()?
        .join(CONFIG_DIR_NAME)
        .join("config.toml");
    if let Some(project_config) = load_optional_config_file(&project_path)? {
        config = merge_configs(config, project_config);
    }

    validate_config(&config)?;

    Ok(config)
}

/// Load a config file, returning `Ok(None)` if it does not exist.
fn load_optional_config_file(path: &Path) -> Result<Option<GhostdashConfig>, ConfigError> {
    match load_config_file(path) {
        Ok(config) => Ok(Some(config)),
        Err(ConfigError::IoError { source }) if source.kind() == std::io::ErrorKind::NotFound => {
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Load a configuration file from the given path.
pub fn load_config_file(path: &Path) -> Result<GhostdashConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| ConfigError::ConfigParseError {
        message: format!("'{}': {}", path.display(), e),
    })
}

/// Merge two configurations, with `override_config` taking precedence field by field.
pub fn merge_configs(base: GhostdashConfig, override_config: GhostdashConfig) -> GhostdashConfig {
    GhostdashConfig {
        remote: RemoteConfig {
            base_url: override_config.remote.base_url.or(base.remote.base_url),
            request_timeout_secs: override_config
                .remote
                .request_timeout_secs
                .or(base.remote.request_timeout_secs),
        },
        polling: PollingConfig {
            list_interval_ms: override_config
                .polling
                .list_interval_ms
                .or(base.polling.list_interval_ms),
            active_interval_ms: override_config
                .polling
                .active_interval_ms
                .or(base.polling.active_interval_ms),
        },
        export: ExportConfig {
            directory: override_config
                .export
                .directory
                .or(base.export.directory)
                .map(expand_home),
        },
    }
}

/// Expand a leading `~` in a configured directory.
fn expand_home(path: PathBuf) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path,
        },
        Err(_) => path,
    }
}
