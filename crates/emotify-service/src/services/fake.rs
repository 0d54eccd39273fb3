//! Scripted in-memory remote API for service tests

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use emotify_core::{
    ApiError, ApiResult, DiscordApi, Guild, GuildEmoji, Message, MessageQuery, ReactionId,
    Snowflake,
};

use super::cancel::CancelFlag;

/// One recorded remote call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Guilds,
    Emojis(u64),
    Page {
        before: Option<u64>,
        after: Option<u64>,
    },
    Add(u64, String),
    Remove(u64, String),
}

impl Call {
    pub fn is_page(&self) -> bool {
        matches!(self, Self::Page { .. })
    }

    pub fn is_reaction(&self) -> bool {
        matches!(self, Self::Add(..) | Self::Remove(..))
    }
}

#[derive(Default)]
struct State {
    guilds: Vec<Guild>,
    guilds_error: Option<ApiError>,
    emojis: HashMap<Snowflake, ApiResult<Vec<GuildEmoji>>>,
    /// Ascending message ids
    history: Vec<Snowflake>,
    page_script: VecDeque<ApiError>,
    reaction_script: VecDeque<ApiResult<()>>,
    /// Raise the flag while serving the n-th reaction call
    cancel_on: Option<(usize, CancelFlag)>,
    calls: Vec<Call>,
}

/// Fake remote API behaving like the real history endpoint
///
/// Scripted errors are consumed in order before falling back to normal
/// behaviour.
#[derive(Default)]
pub struct FakeApi {
    state: Mutex<State>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(self, ids: impl IntoIterator<Item = u64>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.history = ids.into_iter().map(Snowflake::new).collect();
            state.history.sort();
        }
        self
    }

    pub fn with_guild(self, id: u64, emojis: &[(u64, &str)]) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.guilds.push(Guild::new(Snowflake::new(id), format!("guild-{id}")));
            let list = emojis
                .iter()
                .map(|(emoji_id, name)| GuildEmoji::new(Snowflake::new(*emoji_id), *name))
                .collect();
            state.emojis.insert(Snowflake::new(id), Ok(list));
        }
        self
    }

    pub fn with_failing_guild(self, id: u64, error: ApiError) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.guilds.push(Guild::new(Snowflake::new(id), format!("guild-{id}")));
            state.emojis.insert(Snowflake::new(id), Err(error));
        }
        self
    }

    pub fn with_guilds_error(self, error: ApiError) -> Self {
        self.state.lock().unwrap().guilds_error = Some(error);
        self
    }

    pub fn script_pages(self, errors: impl IntoIterator<Item = ApiError>) -> Self {
        self.state.lock().unwrap().page_script.extend(errors);
        self
    }

    pub fn script_reactions(self, results: impl IntoIterator<Item = ApiResult<()>>) -> Self {
        self.state.lock().unwrap().reaction_script.extend(results);
        self
    }

    pub fn cancel_on_reaction(self, nth: usize, flag: CancelFlag) -> Self {
        self.state.lock().unwrap().cancel_on = Some((nth, flag));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn reaction_calls(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_reaction).collect()
    }

    pub fn page_calls(&self) -> usize {
        self.calls().iter().filter(|c| c.is_page()).count()
    }

    pub fn emoji_fetches(&self, guild_id: u64) -> usize {
        self.calls()
            .iter()
            .filter(|c| **c == Call::Emojis(guild_id))
            .count()
    }

    fn react(&self, call: Call) -> ApiResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        let served = state.calls.iter().filter(|c| c.is_reaction()).count();
        if let Some((nth, flag)) = &state.cancel_on {
            if served == *nth {
                flag.cancel();
            }
        }
        state.reaction_script.pop_front().unwrap_or(Ok(()))
    }
}

#[async_trait]
impl DiscordApi for FakeApi {
    async fn current_guilds(&self) -> ApiResult<Vec<Guild>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Guilds);
        match &state.guilds_error {
            Some(err) => Err(err.clone()),
            None => Ok(state.guilds.clone()),
        }
    }

    async fn guild_emojis(&self, guild_id: Snowflake) -> ApiResult<Vec<GuildEmoji>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Emojis(guild_id.into_inner()));
        state
            .emojis
            .get(&guild_id)
            .cloned()
            .unwrap_or_else(|| Err(ApiError::from_status(404, "Unknown Guild")))
    }

    async fn channel_messages(
        &self,
        _channel_id: Snowflake,
        query: MessageQuery,
    ) -> ApiResult<Vec<Message>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Page {
            before: query.before.map(Snowflake::into_inner),
            after: query.after.map(Snowflake::into_inner),
        });
        if let Some(err) = state.page_script.pop_front() {
            return Err(err);
        }

        let limit = query.limit as usize;
        let mut page: Vec<Snowflake> = if let Some(after) = query.after {
            // Oldest `limit` messages newer than the cursor
            state
                .history
                .iter()
                .copied()
                .filter(|id| *id > after)
                .take(limit)
                .collect()
        } else {
            // Newest `limit` messages older than the cursor
            let older: Vec<Snowflake> = state
                .history
                .iter()
                .copied()
                .filter(|id| query.before.map_or(true, |before| *id < before))
                .collect();
            older[older.len().saturating_sub(limit)..].to_vec()
        };

        // Pages always come back newest-first
        page.reverse();
        Ok(page.into_iter().map(Message::new).collect())
    }

    async fn add_reaction(
        &self,
        _channel_id: Snowflake,
        message_id: Snowflake,
        emoji: &ReactionId,
    ) -> ApiResult<()> {
        self.react(Call::Add(message_id.into_inner(), emoji.to_string()))
    }

    async fn remove_reaction(
        &self,
        _channel_id: Snowflake,
        message_id: Snowflake,
        emoji: &ReactionId,
    ) -> ApiResult<()> {
        self.react(Call::Remove(message_id.into_inner(), emoji.to_string()))
    }
}
