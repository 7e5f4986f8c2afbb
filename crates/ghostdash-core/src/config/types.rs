//! Configuration type definitions for ghostdash.
//!
//! Every field is optional in the file so that user and project configs can
//! be merged field by field; accessors on [`GhostdashConfig`] fill in defaults.
//!
//! # Example Configuration
//!
//! ```toml
//! [remote]
//! base_url = "https://groceryghost-api.qubzes.com/api"
//!
//! [polling]
//! active_interval_ms = 500
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::defaults;

/// Main configuration loaded from TOML config files.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct GhostdashConfig {
    /// Remote job API settings
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Revalidation intervals for the polling scheduler
    #[serde(default)]
    pub polling: PollingConfig,

    /// Where exported files are written by the CLI save target
    #[serde(default)]
    pub export: ExportConfig,
}

/// Remote job API configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RemoteConfig {
    /// Base address every endpoint is appended to (no trailing slash needed).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Per-request timeout in seconds. Default: 30.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

/// Polling intervals.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PollingConfig {
    /// Interval for the session list. Default: 2000ms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_interval_ms: Option<u64>,

    /// Interval for queued / in-progress session details. Default: 1000ms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_interval_ms: Option<u64>,
}

/// Export configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ExportConfig {
    /// Directory exported files are saved into. Default: current directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

impl GhostdashConfig {
    pub fn base_url(&self) -> &str {
        self.remote
            .base_url
            .as_deref()
            .unwrap_or(defaults::DEFAULT_BASE_URL)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.remote
                .request_timeout_secs
                .unwrap_or(defaults::DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    pub fn list_interval(&self) -> Duration {
        Duration::from_millis(
            self.polling
                .list_interval_ms
                .unwrap_or(defaults::DEFAULT_LIST_INTERVAL_MS),
        )
    }

    pub fn active_interval(&self) -> Duration {
        Duration::from_millis(
            self.polling
                .active_interval_ms
                .unwrap_or(defaults::DEFAULT_ACTIVE_INTERVAL_MS),
        )
    }

    pub fn export_directory(&self) -> PathBuf {
        self.export
            .directory
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
