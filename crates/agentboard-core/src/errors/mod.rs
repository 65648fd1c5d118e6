use std::error::Error;

/// Base trait for all agentboard errors
pub trait BoardError: Error + Send + Sync + 'static {
    /// Error code for programmatic handling
    fn error_code(&self) -> &'static str;

    /// Whether this error was caused by user input rather than the system
    fn is_user_error(&self) -> bool {
        false
    }
}

/// Common result type for the application
pub type BoardResult<T> = Result<T, Box<dyn BoardError>>;

impl BoardError for agentboard_config::ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            agentboard_config::ConfigError::ConfigParseError { .. } => "CONFIG_PARSE_ERROR",
            agentboard_config::ConfigError::InvalidConfiguration { .. } => "INVALID_CONFIGURATION",
            agentboard_config::ConfigError::IoError { .. } => "CONFIG_IO_ERROR",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            agentboard_config::ConfigError::ConfigParseError { .. }
                | agentboard_config::ConfigError::InvalidConfiguration { .. }
        )
    }
}

impl BoardError for agentboard_paths::PathError {
    fn error_code(&self) -> &'static str {
        match self {
            agentboard_paths::PathError::HomeNotFound => "HOME_NOT_FOUND",
        }
    }
}
