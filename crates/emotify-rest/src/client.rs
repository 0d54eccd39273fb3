//! REST client for the remote chat API

use std::time::Duration;

use async_trait::async_trait;
use emotify_common::{AppError, AppResult, DiscordConfig};
use emotify_core::{
    ApiResult, DiscordApi, Guild, GuildEmoji, Message, MessageQuery, ReactionId, Snowflake,
};
use reqwest::header::{AUTHORIZATION, CONTENT_LENGTH};
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use tracing::{debug, instrument};

use crate::response;

/// Connection settings for [`RestClient`]
#[derive(Clone)]
pub struct RestClientConfig {
    pub api_base: String,
    pub token: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl From<&DiscordConfig> for RestClientConfig {
    fn from(config: &DiscordConfig) -> Self {
        Self {
            api_base: config.api_base.clone(),
            token: config.token.clone(),
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
        }
    }
}

/// `reqwest`-backed implementation of [`DiscordApi`]
///
/// One client (and its connection pool) belongs to one engine. Each request
/// carries the configured connect/read timeout.
#[derive(Clone)]
pub struct RestClient {
    http: Client,
    base: Url,
    token: String,
}

impl RestClient {
    /// Create a new client
    pub fn new(config: RestClientConfig) -> AppResult<Self> {
        let base = Url::parse(config.api_base.trim_end_matches('/'))
            .map_err(|e| AppError::Config(format!("invalid API base URL: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(AppError::Config(format!(
                "API base URL cannot carry a path: {base}"
            )));
        }

        let http = Client::builder()
            .user_agent(config.user_agent)
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .build()
            .map_err(AppError::internal)?;

        Ok(Self {
            http,
            base,
            token: config.token,
        })
    }

    /// Build an endpoint URL from raw path segments (each is percent-encoded)
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // `new` rejects cannot-be-a-base URLs, so this always succeeds
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .header(AUTHORIZATION, self.token.as_str())
    }

    async fn send(&self, request: RequestBuilder) -> ApiResult<Response> {
        let response = request.send().await.map_err(response::transport)?;
        response::check(response).await
    }

    async fn react(
        &self,
        method: Method,
        channel_id: Snowflake,
        message_id: Snowflake,
        emoji: &ReactionId,
    ) -> ApiResult<()> {
        let channel = channel_id.to_string();
        let message = message_id.to_string();
        let url = self.endpoint(&[
            "channels",
            &channel,
            "messages",
            &message,
            "reactions",
            emoji.as_str(),
            "@me",
        ]);

        let request = self.request(method, url).header(CONTENT_LENGTH, "0");
        self.send(request).await?;
        Ok(())
    }
}

#[async_trait]
impl DiscordApi for RestClient {
    #[instrument(skip(self))]
    async fn current_guilds(&self) -> ApiResult<Vec<Guild>> {
        let url = self.endpoint(&["users", "@me", "guilds"]);
        let response = self.send(self.request(Method::GET, url)).await?;
        let guilds: Vec<Guild> = response::json(response).await?;
        debug!(count = guilds.len(), "Fetched guild list");
        Ok(guilds)
    }

    #[instrument(skip(self))]
    async fn guild_emojis(&self, guild_id: Snowflake) -> ApiResult<Vec<GuildEmoji>> {
        let guild = guild_id.to_string();
        let url = self.endpoint(&["guilds", &guild, "emojis"]);
        let response = self.send(self.request(Method::GET, url)).await?;
        response::json(response).await
    }

    #[instrument(skip(self))]
    async fn channel_messages(
        &self,
        channel_id: Snowflake,
        query: MessageQuery,
    ) -> ApiResult<Vec<Message>> {
        let channel = channel_id.to_string();
        let mut url = self.endpoint(&["channels", &channel, "messages"]);
        {
            let mut params = url.query_pairs_mut();
            params.append_pair("limit", &query.limit.to_string());
            if let Some(before) = query.before {
                params.append_pair("before", &before.to_string());
            }
            if let Some(after) = query.after {
                params.append_pair("after", &after.to_string());
            }
        }

        let response = self.send(self.request(Method::GET, url)).await?;
        let page: Vec<Message> = response::json(response).await?;
        debug!(count = page.len(), "Fetched message page");
        Ok(page)
    }

    #[instrument(skip(self), fields(emoji = %emoji))]
    async fn add_reaction(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        emoji: &ReactionId,
    ) -> ApiResult<()> {
        self.react(Method::PUT, channel_id, message_id, emoji).await
    }

    #[instrument(skip(self), fields(emoji = %emoji))]
    async fn remove_reaction(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        emoji: &ReactionId,
    ) -> ApiResult<()> {
        self.react(Method::DELETE, channel_id, message_id, emoji).await
    }
}
