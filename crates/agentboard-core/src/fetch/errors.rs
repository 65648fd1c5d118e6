use crate::errors::BoardError;

/// Normalized failure of one relay call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("Relay unreachable: {message}")]
    Transport { message: String },

    #[error("Relay returned HTTP {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Malformed relay response: {message}")]
    Malformed { message: String },

    #[error("Request cancelled")]
    Cancelled,

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },
}

impl FetchError {
    /// Whether trying the same request later could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Transport { .. } => true,
            FetchError::Upstream { status, .. } => *status == 429 || *status >= 500,
            FetchError::Malformed { .. } | FetchError::Cancelled | FetchError::InvalidRequest { .. } => {
                false
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }
}

impl BoardError for FetchError {
    fn error_code(&self) -> &'static str {
        match self {
            FetchError::Transport { .. } => "FETCH_TRANSPORT_ERROR",
            FetchError::Upstream { .. } => "FETCH_UPSTREAM_ERROR",
            FetchError::Malformed { .. } => "FETCH_MALFORMED_RESPONSE",
            FetchError::Cancelled => "FETCH_CANCELLED",
            FetchError::InvalidRequest { .. } => "FETCH_INVALID_REQUEST",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(self, FetchError::InvalidRequest { .. })
    }
}
