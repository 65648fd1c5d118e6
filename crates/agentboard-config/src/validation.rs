//! Configuration validation logic.

use crate::errors::ConfigError;
use crate::types::BoardConfig;

/// Validate a BoardConfig, returning an error if any values are invalid.
///
/// # Validation Rules
///
/// - `sync.window_size` must be at least 1
/// - `sync.poll_interval_secs` and `sync.fetch_timeout_secs` must be at least 1
/// - `sync.max_pages` must be at least 1
/// - `relay.base_url` must be an http(s) URL
pub fn validate_config(config: &BoardConfig) -> Result<(), ConfigError> {
    if config.sync.window_size() == 0 {
        return Err(invalid("sync.window_size must be at least 1"));
    }

    if config.sync.poll_interval().is_zero() {
        return Err(invalid("sync.poll_interval_secs must be at least 1"));
    }

    if config.sync.fetch_timeout().is_zero() {
        return Err(invalid("sync.fetch_timeout_secs must be at least 1"));
    }

    if config.sync.max_pages() == 0 {
        return Err(invalid("sync.max_pages must be at least 1"));
    }

    let url = config.relay.base_url();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::InvalidConfiguration {
            message: format!(
                "relay.base_url '{}' must start with http:// or https://",
                url
            ),
        });
    }

    Ok(())
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::InvalidConfiguration {
        message: message.to_string(),
    }
}
