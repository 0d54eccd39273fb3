//! Remote API port
//!
//! The service layer talks to the remote chat API only through this trait.
//! The HTTP implementation lives in `emotify-rest`; tests provide in-memory
//! fakes.

use async_trait::async_trait;

use crate::entities::{Guild, GuildEmoji, Message};
use crate::error::ApiResult;
use crate::value_objects::{ReactionId, Snowflake};

/// Largest page the history endpoint returns
pub const PAGE_SIZE: u32 = 100;

/// Cursor options for a history page
///
/// At most one of `before` / `after` is set. With neither, the newest page
/// is returned. Pages always come back newest-first, whichever cursor
/// produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageQuery {
    pub before: Option<Snowflake>,
    pub after: Option<Snowflake>,
    pub limit: u32,
}

impl Default for MessageQuery {
    fn default() -> Self {
        Self {
            before: None,
            after: None,
            limit: PAGE_SIZE,
        }
    }
}

impl MessageQuery {
    /// Page of messages older than `cursor` (or the newest page)
    pub fn before(cursor: Option<Snowflake>) -> Self {
        Self {
            before: cursor,
            ..Self::default()
        }
    }

    /// Page of messages newer than `cursor`
    pub fn after(cursor: Snowflake) -> Self {
        Self {
            after: Some(cursor),
            ..Self::default()
        }
    }
}

#[async_trait]
pub trait DiscordApi: Send + Sync {
    /// List the guilds the authenticated user belongs to
    async fn current_guilds(&self) -> ApiResult<Vec<Guild>>;

    /// List a guild's custom emoji
    async fn guild_emojis(&self, guild_id: Snowflake) -> ApiResult<Vec<GuildEmoji>>;

    /// Fetch one page of a container's history
    async fn channel_messages(
        &self,
        channel_id: Snowflake,
        query: MessageQuery,
    ) -> ApiResult<Vec<Message>>;

    /// React to a message as the authenticated user
    async fn add_reaction(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        emoji: &ReactionId,
    ) -> ApiResult<()>;

    /// Remove the authenticated user's own reaction
    async fn remove_reaction(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        emoji: &ReactionId,
    ) -> ApiResult<()>;
}
