//! # Configuration System
//!
//! Hierarchical TOML configuration for ghostdash.
//!
//! ## Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.ghostdash/config.toml`
//! 3. **Project config** - `./.ghostdash/config.toml`
//! 4. **CLI arguments** - Command-line flags (highest priority)
//!
//! ## Usage Example
//!
//! ```toml
//! # ~/.ghostdash/config.toml
//! [remote]
//! base_url = "http://localhost:8000/api"
//! request_timeout_secs = 10
//!
//! [polling]
//! list_interval_ms = 2000
//! active_interval_ms = 1000
//!
//! [export]
//! directory = "~/Downloads"
//! ```
//!
//! ## Loading Configuration
//!
//! ```rust,no_run
//! use ghostdash_core::config::GhostdashConfig;
//!
//! fn example() -> Result<(), ghostdash_core::errors::ConfigError> {
//!     let config = GhostdashConfig::load_hierarchy()?;
//!     println!("polling {}", config.base_url());
//!     Ok(())
//! }
//! ```

pub mod defaults;
pub mod loading;
pub mod types;
pub mod validation;

pub use types::{ExportConfig, GhostdashConfig, PollingConfig, RemoteConfig};
pub use validation::validate_config;

impl GhostdashConfig {
    /// Load configuration from the hierarchy of config files.
    ///
    /// See [`loading::load_hierarchy`] for details.
    pub fn load_hierarchy() -> Result<Self, crate::errors::ConfigError> {
        loading::load_hierarchy()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), crate::errors::ConfigError> {
        validation::validate_config(self)
    }
}
