use crate::core::types::TypesError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("HTTP status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid response format: {0}")]
    InvalidResponseFormat(String),

    #[error("API error: {code} - {message}")]
    ApiError { code: i64, message: String },

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] crate::core::config::ConfigError),

    #[error(transparent)]
    Types(#[from] TypesError),
}

/// Coarse classification callers can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Rejected locally before any request was sent.
    Validation,
    /// Connection, timeout or non-2xx status.
    Transport,
    /// Body was not valid JSON or lacked expected fields.
    Format,
    /// Well-formed reply carrying an explicit rejection.
    Exchange,
    Configuration,
}

impl ExchangeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::Types(_) => ErrorKind::Validation,
            Self::HttpError(_) | Self::HttpStatus { .. } | Self::NetworkError(_) => {
                ErrorKind::Transport
            }
            Self::JsonError(_) | Self::InvalidResponseFormat(_) => ErrorKind::Format,
            Self::ApiError { .. } => ErrorKind::Exchange,
            Self::AuthError(_) | Self::ConfigError(_) => ErrorKind::Configuration,
        }
    }

    /// Transport failures are the only kind worth retrying unchanged.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }

    pub fn unrecognized_symbol(symbol: &str) -> Self {
        Self::Validation(format!("unrecognized symbol: {}", symbol))
    }
}
