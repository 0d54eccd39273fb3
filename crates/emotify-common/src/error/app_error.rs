//! Application error types
//!
//! Errors that end a session or stop a run before it is spawned. Failures
//! inside a running worker never surface as `AppError`; they become run events.

use emotify_core::ApiError;

use crate::config::ConfigError;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Authentication errors
    #[error("Invalid token")]
    InvalidToken,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    // Rate limiting
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    // Remote service errors
    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Internal errors
    #[error("Internal error")]
    Internal(#[source] anyhow::Error),
}

impl AppError {
    /// Get error code for the control surface
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidToken => "unauthorized",
            Self::InsufficientPermissions => "forbidden",
            Self::Validation(_) => "validation",
            Self::RateLimitExceeded => "rate-limited",
            Self::Timeout(_) => "timeout",
            Self::ExternalService(_) => "external-service",
            Self::Config(_) => "config",
            Self::Internal(_) => "internal",
        }
    }

    /// Check if the credential itself was rejected
    #[must_use]
    pub fn is_credential_error(&self) -> bool {
        matches!(self, Self::InvalidToken | Self::InsufficientPermissions)
    }

    /// Create a validation error
    #[must_use]
    pub fn validation(msg: impl std::fmt::Display) -> Self {
        Self::Validation(msg.to_string())
    }

    /// Create an internal error from any error
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized => Self::InvalidToken,
            ApiError::Forbidden => Self::InsufficientPermissions,
            ApiError::RateLimited { .. } => Self::RateLimitExceeded,
            ApiError::Transport {
                message,
                timeout: true,
            } => Self::Timeout(message),
            other => Self::ExternalService(other.to_string()),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
