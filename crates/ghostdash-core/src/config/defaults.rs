//! Built-in configuration defaults.

/// Remote job API used when no config overrides it.
pub const DEFAULT_BASE_URL: &str = "https://groceryghost-api.qubzes.com/api";

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// The list must reflect newly created or removed sessions, so it is always polled.
pub const DEFAULT_LIST_INTERVAL_MS: u64 = 2000;

/// Tight enough that a running scrape feels live.
pub const DEFAULT_ACTIVE_INTERVAL_MS: u64 = 1000;

/// Directory name under home / project root holding `config.toml`.
pub const CONFIG_DIR_NAME: &str = ".ghostdash";
