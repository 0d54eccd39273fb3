//! Start-time validation errors
//!
//! A run that fails validation is rejected synchronously; no background task
//! is spawned and no event is emitted.

use thiserror::Error;

/// Reasons a run cannot start
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartError {
    #[error("A run is already active")]
    AlreadyRunning,

    #[error("No channel selected")]
    NoContainer,

    #[error("No emoji given")]
    NoEmoji,

    #[error("Rate must be between 1 and {max} reactions per second, got {rate}")]
    InvalidRate { rate: u32, max: u32 },

    #[error("No valid emoji found from: {}", .tokens.join(" "))]
    NoneResolved { tokens: Vec<String> },
}

impl StartError {
    /// Get error code for the control surface
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyRunning => "already-running",
            Self::NoContainer => "no-container",
            Self::NoEmoji => "no-emoji",
            Self::InvalidRate { .. } => "invalid-rate",
            Self::NoneResolved { .. } => "token-unresolved",
        }
    }
}
