//! Guild entity and its custom emoji

use serde::{Deserialize, Serialize};

use crate::value_objects::{ReactionId, Snowflake};

/// Guild entity (as listed for the current user)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guild {
    pub id: Snowflake,
    #[serde(default)]
    pub name: String,
}

impl Guild {
    /// Create a new Guild
    pub fn new(id: Snowflake, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Custom emoji uploaded to a guild
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildEmoji {
    pub id: Snowflake,
    /// Null for emoji that were deleted while still referenced
    #[serde(default)]
    pub name: Option<String>,
}

impl GuildEmoji {
    /// Create a new GuildEmoji
    pub fn new(id: Snowflake, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
        }
    }

    /// Case-insensitive name comparison
    pub fn matches(&self, name: &str) -> bool {
        self.name
            .as_deref()
            .is_some_and(|own| own.to_lowercase() == name.to_lowercase())
    }

    /// The `name:id` reference used by the reaction endpoints
    pub fn reaction_id(&self) -> Option<ReactionId> {
        self.name
            .as_deref()
            .map(|name| ReactionId::custom(name, self.id))
    }
}
