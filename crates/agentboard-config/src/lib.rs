//! # agentboard-config
//!
//! TOML configuration types, loading, and validation for agentboard.
//!
//! Single source of truth for `BoardConfig`. Depends only on `agentboard-paths`.

mod defaults;
mod loading;
mod validation;

pub mod errors;
pub mod types;

// Public API re-exports
pub use errors::ConfigError;
pub use loading::{RELAY_URL_ENV, load_hierarchy_from, merge_configs};
pub use types::{BoardConfig, FreshnessConfig, RelayConfig, SyncConfig, ViewConfig};
pub use validation::validate_config;

impl BoardConfig {
    /// Load configuration from the hierarchy of config files.
    ///
    /// See [`loading::load_hierarchy`] for details.
    pub fn load_hierarchy() -> Result<Self, ConfigError> {
        loading::load_hierarchy()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validation::validate_config(self)
    }
}
