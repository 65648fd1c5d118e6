use crate::errors::BoardError;

#[derive(Debug, thiserror::Error)]
pub enum TerminalStoreError {
    #[error("Terminal cache file has unexpected namespace '{found}'")]
    WrongNamespace { found: String },

    #[error("Failed to serialize terminal cache: {message}")]
    SerializationError { message: String },

    #[error("IO error on terminal cache: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl BoardError for TerminalStoreError {
    fn error_code(&self) -> &'static str {
        match self {
            TerminalStoreError::WrongNamespace { .. } => "TERMINAL_CACHE_WRONG_NAMESPACE",
            TerminalStoreError::SerializationError { .. } => "TERMINAL_CACHE_SERIALIZATION_ERROR",
            TerminalStoreError::IoError { .. } => "TERMINAL_CACHE_IO_ERROR",
        }
    }
}
