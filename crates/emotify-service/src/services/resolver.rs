//! Emoji token resolver
//!
//! Turns what the user typed into reaction identifiers. A token is either
//! a `:shortcode:`, a literal unicode emoji, or an already-qualified
//! `name:id` custom emoji reference. Shortcodes are looked up in the unicode
//! table first, then among the custom emoji of the user's guilds.

use std::collections::HashMap;

use emotify_core::{DiscordApi, GuildEmoji, ReactionId, Snowflake};
use tracing::{debug, instrument, warn};

/// Session-scoped custom emoji cache, keyed by guild
///
/// Each guild is fetched at most once per session. A failed fetch is cached
/// as an empty list so the guild is not asked again.
#[derive(Debug, Default)]
pub struct GuildEmojiCache {
    entries: HashMap<Snowflake, Vec<GuildEmoji>>,
}

impl GuildEmojiCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached emoji of a guild, if it was loaded
    pub fn get(&self, guild_id: Snowflake) -> Option<&[GuildEmoji]> {
        self.entries.get(&guild_id).map(Vec::as_slice)
    }

    pub fn contains(&self, guild_id: Snowflake) -> bool {
        self.entries.contains_key(&guild_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get a guild's emoji, fetching them on first use
    pub async fn load(&mut self, api: &dyn DiscordApi, guild_id: Snowflake) -> &[GuildEmoji] {
        if !self.entries.contains_key(&guild_id) {
            let emojis = match api.guild_emojis(guild_id).await {
                Ok(emojis) => {
                    debug!(guild_id = %guild_id, count = emojis.len(), "Cached guild emoji");
                    emojis
                }
                Err(e) => {
                    warn!(guild_id = %guild_id, error = %e, "Failed to fetch guild emoji");
                    Vec::new()
                }
            };
            self.entries.insert(guild_id, emojis);
        }
        self.get(guild_id).unwrap_or_default()
    }
}

/// Outcome of resolving a token list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Identifiers in input order
    pub resolved: Vec<ReactionId>,
    /// Tokens that matched nothing
    pub unresolved: Vec<String>,
}

/// Resolves emoji tokens against the unicode table and guild emoji
#[derive(Debug)]
pub struct EmojiResolver {
    guilds: Vec<Snowflake>,
    cache: GuildEmojiCache,
}

impl EmojiResolver {
    /// Create a resolver searching `guilds` in the given order
    pub fn new(guilds: Vec<Snowflake>) -> Self {
        Self {
            guilds,
            cache: GuildEmojiCache::new(),
        }
    }

    pub fn cache(&self) -> &GuildEmojiCache {
        &self.cache
    }

    /// Resolve a single token
    ///
    /// Returns `None` when a shortcode matches neither a unicode emoji nor a
    /// custom emoji in any known guild. Anything that is not a shortcode is
    /// passed through unchanged.
    #[instrument(skip(self, api))]
    pub async fn resolve(
        &mut self,
        api: &dyn DiscordApi,
        token: &str,
        preferred_guild: Option<Snowflake>,
    ) -> Option<ReactionId> {
        let Some(name) = shortcode(token) else {
            return Some(ReactionId::new(token));
        };

        if let Some(emoji) = unicode_emoji(name) {
            return Some(ReactionId::new(emoji.as_str()));
        }

        if let Some(guild_id) = preferred_guild {
            if let Some(found) = find_custom(self.cache.load(api, guild_id).await, name) {
                return Some(found);
            }
        }

        for &guild_id in &self.guilds {
            if Some(guild_id) == preferred_guild {
                continue;
            }
            if let Some(found) = find_custom(self.cache.load(api, guild_id).await, name) {
                debug!(guild_id = %guild_id, emoji = %found, "Resolved from fallback guild");
                return Some(found);
            }
        }

        None
    }

    /// Resolve a comma/whitespace separated token list
    pub async fn resolve_all(
        &mut self,
        api: &dyn DiscordApi,
        input: &str,
        preferred_guild: Option<Snowflake>,
    ) -> Resolution {
        let mut resolution = Resolution::default();
        for token in parse_tokens(input) {
            match self.resolve(api, token, preferred_guild).await {
                Some(id) => resolution.resolved.push(id),
                None => resolution.unresolved.push(token.to_string()),
            }
        }
        resolution
    }
}

/// Split raw input on runs of whitespace and commas
pub fn parse_tokens(input: &str) -> Vec<&str> {
    input
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .collect()
}

/// The `name` of a `:name:` token
fn shortcode(token: &str) -> Option<&str> {
    let name = token.strip_prefix(':')?.strip_suffix(':')?;
    let valid = !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_');
    valid.then_some(name)
}

/// Gemoji shortcode first, then the CLDR name with spaces as underscores
fn unicode_emoji(name: &str) -> Option<&'static emojis::Emoji> {
    emojis::get_by_shortcode(name).or_else(|| {
        emojis::iter().find(|emoji| emoji.name().replace(' ', "_").eq_ignore_ascii_case(name))
    })
}

fn find_custom(emojis: &[GuildEmoji], name: &str) -> Option<ReactionId> {
    emojis
        .iter()
        .find(|emoji| emoji.matches(name))
        .and_then(GuildEmoji::reaction_id)
}
