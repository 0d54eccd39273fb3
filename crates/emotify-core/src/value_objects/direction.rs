//! Traversal direction and reaction mode

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Chronological order in which a container's history is visited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    /// Most recent message first, walking back in time
    #[default]
    NewestFirst,
    /// First message ever posted first, walking forward in time
    OldestFirst,
}

impl Direction {
    /// Human-readable label, as shown in status lines
    pub fn label(&self) -> &'static str {
        match self {
            Self::NewestFirst => "Newest → Oldest",
            Self::OldestFirst => "Oldest → Newest",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NewestFirst => "newest-first",
            Self::OldestFirst => "oldest-first",
        })
    }
}

/// Error when parsing a direction from user input
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown direction '{0}' (expected newest-first or oldest-first)")]
pub struct DirectionParseError(pub String);

impl FromStr for Direction {
    type Err = DirectionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "newest" | "newest-first" | "newest_first" => Ok(Self::NewestFirst),
            "oldest" | "oldest-first" | "oldest_first" => Ok(Self::OldestFirst),
            _ => Err(DirectionParseError(s.to_string())),
        }
    }
}

/// Whether a run adds reactions or clears the caller's own reactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionMode {
    #[default]
    Add,
    Remove,
}

impl ReactionMode {
    /// Map the control surface's "clear reactions" checkbox
    pub fn from_clear(clear: bool) -> Self {
        if clear {
            Self::Remove
        } else {
            Self::Add
        }
    }

    #[inline]
    pub fn is_clear(&self) -> bool {
        matches!(self, Self::Remove)
    }
}
