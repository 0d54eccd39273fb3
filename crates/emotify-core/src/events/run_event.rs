//! Run events
//!
//! A run never calls back into its caller. Everything it has to say goes out
//! as one of these values on the run's event channel.

use std::fmt;

use serde::Serialize;

/// Counters after the most recent reaction call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Progress {
    pub messages: u64,
    pub reactions: u64,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Msgs {} | Reactions {}", self.messages, self.reactions)
    }
}

/// Category of a notice shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoticeKind {
    Unauthorized,
    Forbidden,
    RateLimitedRecovered,
    RateLimitExhausted,
    TokenUnresolved,
    ReactionFailed,
    HistoryUnavailable,
}

impl NoticeKind {
    /// Stable token for the control surface
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::RateLimitedRecovered => "rate-limited-recovered",
            Self::RateLimitExhausted => "rate-limit-exhausted",
            Self::TokenUnresolved => "token-unresolved",
            Self::ReactionFailed => "reaction-failed",
            Self::HistoryUnavailable => "history-unavailable",
        }
    }

    /// Check if this notice accompanies the end of a run
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized | Self::Forbidden | Self::RateLimitExhausted
        )
    }
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A categorized message for the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub detail: String,
}

impl Notice {
    pub fn new(kind: NoticeKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.detail)
    }
}

/// Event emitted by a running worker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunEvent {
    /// Free-form progress text
    Status(String),
    /// The run started or ended
    Running(bool),
    /// Advisory counters; may be dropped under load
    Progress(Progress),
    /// Categorized error or warning
    Notice(Notice),
}

/// Why a run ended in the fatal state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FatalReason {
    Unauthorized,
    Forbidden,
    RateLimited,
}

impl FatalReason {
    /// The notice category that reports this reason
    pub fn notice_kind(&self) -> NoticeKind {
        match self {
            Self::Unauthorized => NoticeKind::Unauthorized,
            Self::Forbidden => NoticeKind::Forbidden,
            Self::RateLimited => NoticeKind::RateLimitExhausted,
        }
    }
}

/// Terminal state of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "end", rename_all = "lowercase")]
pub enum RunEnd {
    /// History exhausted, or the message limit was reached
    Completed { limit_reached: bool },
    /// Stopped on request
    Cancelled,
    /// Aborted by an authorization or throttling failure
    Fatal { reason: FatalReason },
}

/// Final report of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunOutcome {
    pub end: RunEnd,
    pub messages: u64,
    pub reactions: u64,
    /// Reaction calls that failed without stopping the run
    pub failed_reactions: u64,
}

impl RunOutcome {
    /// One-line summary for the status stream
    pub fn summary(&self) -> String {
        let progress = Progress {
            messages: self.messages,
            reactions: self.reactions,
        };
        let tail = match self.end {
            RunEnd::Completed {
                limit_reached: true,
            } => " (limit reached)".to_string(),
            RunEnd::Completed {
                limit_reached: false,
            } => " (done)".to_string(),
            RunEnd::Cancelled => " (stopped)".to_string(),
            RunEnd::Fatal { reason } => format!(" (aborted: {})", reason.notice_kind()),
        };
        if self.failed_reactions > 0 {
            format!("{progress}{tail}, {} failed", self.failed_reactions)
        } else {
            format!("{progress}{tail}")
        }
    }
}
