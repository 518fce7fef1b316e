use std::time::Duration;
use thiserror::Error;

/// Outcome of a single failed remote API call
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// 404 - missing repository, branch or path
    #[error("not found: {0}")]
    NotFound(String),

    /// 401 - token missing, expired or revoked
    #[error("unauthorized")]
    Unauthorized,

    /// 429, or 403 with an exhausted rate budget
    #[error("rate limited (retry after {retry_after:?})")]
    RateLimited { retry_after: Option<Duration> },

    /// Any other non-2xx status
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// Connection, TLS or timeout failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Unexpected response body
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn is_auth_error(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::RateLimited { .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(ApiError::Unauthorized.is_auth_error());
        assert!(!ApiError::NotFound("x".into()).is_auth_error());
        assert!(ApiError::RateLimited { retry_after: None }.is_retryable());
        assert!(
            !ApiError::Status {
                status: 500,
                message: "boom".into()
            }
            .is_retryable()
        );
    }
}
