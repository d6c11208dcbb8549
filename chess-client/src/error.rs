//! Error types for the backend client

use std::time::Duration;
use thiserror::Error;

pub type BackendResult<T> = Result<T, BackendError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),

    #[error("Request failed: {0}")]
    Network(String),

    #[error("Backend returned HTTP {0}")]
    Status(u16),

    #[error("Backend returned invalid data: {0}")]
    Decode(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Mock response not configured for: {0}")]
    NotConfigured(String),
}

impl BackendError {
    /// Whether the failure means the backend could not serve the request.
    /// Only a bad URL is a local configuration problem.
    pub fn is_unreachable(&self) -> bool {
        !matches!(self, Self::InvalidUrl(_))
    }

    pub(crate) fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout)
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Status(status.as_u16())
        } else {
            Self::Network(err.to_string())
        }
    }
}
