use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    // Caller errors
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("No adapter can handle id: {id}")]
    NotFound { id: String },

    // Provider errors
    #[error("Lyrics provider {provider} failed: {reason}")]
    ProviderFailed { provider: String, reason: String },

    #[error("{url} returned HTTP status {status}")]
    HttpStatus { status: u16, url: String },

    #[error("Failed to parse {what}: {reason}")]
    Parse { what: String, reason: String },

    // Configuration errors
    #[error("Config file not found at {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid config: {message}")]
    ConfigInvalid { message: String },

    #[error("Failed to parse config file: {0}")]
    ConfigParseError(#[from] toml::de::Error),

    // Network errors
    #[error("Network request failed: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Network request failed: {0}")]
    MiddlewareError(#[from] reqwest_middleware::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    // IO errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CoreError {
    /// Shorthand for a [`CoreError::InvalidArgument`].
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Whether this error is a transient provider condition (network, status, body)
    /// that adapters swallow instead of propagating.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::HttpStatus { .. }
                | Self::Parse { .. }
                | Self::NetworkError(_)
                | Self::MiddlewareError(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_names_the_id() {
        let err = CoreError::NotFound {
            id: "https://example.com/unsupported".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "No adapter can handle id: https://example.com/unsupported"
        );
    }

    #[test]
    fn test_transient_classification() {
        let status = CoreError::HttpStatus {
            status: 503,
            url: "https://www.songlyrics.com/".to_string(),
        };
        assert!(status.is_transient());
        assert!(!CoreError::invalid_argument("track_id required").is_transient());
        assert!(!CoreError::NotFound { id: "x".into() }.is_transient());
    }
}
