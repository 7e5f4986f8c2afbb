use crate::config::types::GhostdashConfig;
use crate::errors::ConfigError;

/// Validate a merged configuration.
///
/// The base URL must be an http(s) address; timeouts and intervals must be
/// non-zero (a zero interval would turn the scheduler into a busy loop).
pub fn validate_config(config: &GhostdashConfig) -> Result<(), ConfigError> {
    let base_url = config.base_url();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(ConfigError::InvalidConfiguration {
            message: format!("remote.base_url must start with http:// or https://, got '{base_url}'"),
        });
    }

    if config.remote.request_timeout_secs == Some(0) {
        return Err(ConfigError::InvalidConfiguration {
            message: "remote.request_timeout_secs must be greater than 0".to_string(),
        });
    }

    if config.polling.list_interval_ms == Some(0) {
        return Err(ConfigError::InvalidConfiguration {
            message: "polling.list_interval_ms must be greater than 0".to_string(),
        });
    }

    if config.polling.active_interval_ms == Some(0) {
        return Err(ConfigError::InvalidConfiguration {
            message: "polling.active_interval_ms must be greater than 0".to_string(),
        });
    }

    Ok(())
}
