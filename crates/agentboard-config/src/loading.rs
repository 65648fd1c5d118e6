//! Configuration loading and merging logic.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.agentboard/config.toml` (global user preferences)
//! 3. **Project config** - `./.agentboard/config.toml` (project-specific overrides)
//! 4. **Environment** - `AGENTBOARD_RELAY_URL`
//! 5. **CLI arguments** - Command-line flags (highest priority, applied by the caller)

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::errors::ConfigError;
use crate::types::{BoardConfig, FreshnessConfig, RelayConfig, SyncConfig, ViewConfig};
use crate::validation::validate_config;

/// Environment variable that overrides `relay.base_url`.
pub const RELAY_URL_ENV: &str = "AGENTBOARD_RELAY_URL";

/// Load configuration from the hierarchy of config files.
///
/// # Errors
///
/// Returns an error if a file exists but cannot be parsed, or if validation
/// fails. Missing config files are not errors.
pub fn load_hierarchy() -> Result<BoardConfig, ConfigError> {
    let user_path = agentboard_paths::BoardPaths::resolve()
        .ok()
        .map(|paths| paths.user_config());
    let project_path = std::env::current_dir()
        .ok()
        .map(|root| agentboard_paths::BoardPaths::project_config(&root));

    load_hierarchy_from(user_path.as_deref(), project_path.as_deref())
}

/// Load and merge the given config files on top of the defaults.
pub fn load_hierarchy_from(
    user_path: Option<&Path>,
    project_path: Option<&Path>,
) -> Result<BoardConfig, ConfigError> {
    let mut config = BoardConfig::default();

    for path in [user_path, project_path].into_iter().flatten() {
        if let Some(file_config) = load_config_file(path)? {
            config = merge_configs(config, file_config);
        }
    }

    apply_env_overrides(&mut config);
    validate_config(&config)?;

    Ok(config)
}

/// Load a configuration file. `Ok(None)` when the file does not exist.
fn load_config_file(path: &Path) -> Result<Option<BoardConfig>, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(event = "config.load.file_missing", path = %path.display());
            return Ok(None);
        }
        Err(e) => return Err(ConfigError::from(e)),
    };

    let config: BoardConfig =
        toml::from_str(&content).map_err(|e| ConfigError::ConfigParseError {
            message: format!("'{}': {}", path.display(), e),
        })?;

    debug!(event = "config.load.file_loaded", path = %path.display());
    Ok(Some(config))
}

fn apply_env_overrides(config: &mut BoardConfig) {
    if let Ok(url) = std::env::var(RELAY_URL_ENV)
        && !url.trim().is_empty()
    {
        debug!(event = "config.load.env_override", var = RELAY_URL_ENV);
        config.relay.base_url = Some(url.trim().to_string());
    }
}

/// Merge two configurations, with override_config taking precedence.
pub fn merge_configs(base: BoardConfig, override_config: BoardConfig) -> BoardConfig {
    BoardConfig {
        relay: RelayConfig::merge(&base.relay, &override_config.relay),
        sync: SyncConfig::merge(&base.sync, &override_config.sync),
        freshness: FreshnessConfig::merge(&base.freshness, &override_config.freshness),
        view: ViewConfig::merge(&base.view, &override_config.view),
    }
}
