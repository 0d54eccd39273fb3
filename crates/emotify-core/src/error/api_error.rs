//! Remote API errors - the failure taxonomy of a single remote call

use std::time::Duration;

use thiserror::Error;

/// How the worker must react to a failed call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Abort the run immediately
    Fatal,
    /// Wait for the server-specified delay, then reissue the same call
    Throttled,
    /// Report, skip the affected item, keep traversing
    Skippable,
}

/// Errors returned by a remote API call
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    // =========================================================================
    // Fatal
    // =========================================================================
    #[error("Unauthorized (401)")]
    Unauthorized,

    #[error("Forbidden (403)")]
    Forbidden,

    // =========================================================================
    // Throttling
    // =========================================================================
    #[error("Rate limited (429)")]
    RateLimited {
        /// Server-specified delay, if the response carried a parseable one
        retry_after: Option<Duration>,
    },

    // =========================================================================
    // Per-item failures
    // =========================================================================
    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Transport error: {message}")]
    Transport { message: String, timeout: bool },

    #[error("Malformed response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Build the error for a non-success status code
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            429 => Self::RateLimited { retry_after: None },
            _ => Self::Status {
                status,
                body: body.into(),
            },
        }
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>, timeout: bool) -> Self {
        Self::Transport {
            message: message.into(),
            timeout,
        }
    }

    /// Classify for the worker's retry/abort policy
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Unauthorized | Self::Forbidden => ErrorClass::Fatal,
            Self::RateLimited { .. } => ErrorClass::Throttled,
            Self::Status { .. } | Self::Transport { .. } | Self::Decode(_) => {
                ErrorClass::Skippable
            }
        }
    }

    /// Check if this error must end the run
    #[inline]
    pub fn is_fatal(&self) -> bool {
        self.class() == ErrorClass::Fatal
    }

    /// Check if this is a connect/read timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport { timeout: true, .. })
    }

    /// HTTP status code, when the failure came from a response
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::Forbidden => Some(403),
            Self::RateLimited { .. } => Some(429),
            Self::Status { status, .. } => Some(*status),
            Self::Transport { .. } | Self::Decode(_) => None,
        }
    }
}

/// Result type for remote API operations
pub type ApiResult<T> = Result<T, ApiError>;
