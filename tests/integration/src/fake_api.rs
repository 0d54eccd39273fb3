//! In-process fake of the remote chat API
//!
//! Serves the handful of endpoints the engine uses, with the same paging and
//! error shapes as the real service, and records every reaction call.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::{Path, Query, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

/// HTTP verb of a reaction call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionMethod {
    Put,
    Delete,
}

/// A reaction call the fake accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedReaction {
    pub method: ReactionMethod,
    pub channel_id: u64,
    pub message_id: u64,
    /// Percent-decoded path segment
    pub emoji: String,
}

/// A history page request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub channel_id: u64,
    pub limit: usize,
    pub before: Option<u64>,
    pub after: Option<u64>,
}

/// Mutable state behind the fake
#[derive(Debug, Default)]
pub struct FakeDiscord {
    /// Accepted credential
    pub token: String,
    pub guilds: Vec<(u64, String)>,
    pub emojis: HashMap<u64, Vec<(u64, String)>>,
    /// Ascending message ids per channel
    pub channels: HashMap<u64, Vec<u64>>,
    /// The next N reaction calls answer 429
    pub rate_limits: u32,
    /// `retry_after` seconds carried by a 429
    pub retry_after: f64,
    /// Reactions on these messages answer 403
    pub forbidden: HashSet<u64>,
    /// Reactions on these messages answer 404
    pub missing: HashSet<u64>,
    pub reactions: Vec<RecordedReaction>,
    pub reaction_attempts: usize,
    pub page_requests: Vec<PageRequest>,
    pub emoji_requests: Vec<u64>,
}

/// Shared handle to the fake's state
pub type SharedFake = Arc<Mutex<FakeDiscord>>;

/// Lock the fake's state
pub fn lock(state: &SharedFake) -> MutexGuard<'_, FakeDiscord> {
    state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Build the fake's routes
pub fn router(state: SharedFake) -> Router {
    Router::new()
        .route("/users/@me/guilds", get(list_guilds))
        .route("/guilds/:guild_id/emojis", get(list_emojis))
        .route("/channels/:channel_id/messages", get(list_messages))
        .route(
            "/channels/:channel_id/messages/:message_id/reactions/:emoji/@me",
            put(add_reaction).delete(remove_reaction),
        )
        .with_state(state)
}

fn error(status: StatusCode, message: &str, code: u32) -> Response {
    (status, Json(json!({ "message": message, "code": code }))).into_response()
}

fn authorize(state: &FakeDiscord, headers: &HeaderMap) -> Result<(), Response> {
    let given = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    if given == Some(state.token.as_str()) {
        Ok(())
    } else {
        Err(error(StatusCode::UNAUTHORIZED, "401: Unauthorized", 0))
    }
}

async fn list_guilds(State(state): State<SharedFake>, headers: HeaderMap) -> Response {
    let state = lock(&state);
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }

    let guilds: Vec<Value> = state
        .guilds
        .iter()
        .map(|(id, name)| json!({ "id": id.to_string(), "name": name, "icon": null }))
        .collect();
    Json(guilds).into_response()
}

async fn list_emojis(
    State(state): State<SharedFake>,
    Path(guild_id): Path<u64>,
    headers: HeaderMap,
) -> Response {
    let mut state = lock(&state);
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }
    state.emoji_requests.push(guild_id);

    match state.emojis.get(&guild_id) {
        Some(emojis) => {
            let emojis: Vec<Value> = emojis
                .iter()
                .map(|(id, name)| json!({ "id": id.to_string(), "name": name, "animated": false }))
                .collect();
            Json(emojis).into_response()
        }
        None => error(StatusCode::NOT_FOUND, "Unknown Guild", 10004),
    }
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    limit: Option<usize>,
    before: Option<u64>,
    after: Option<u64>,
}

async fn list_messages(
    State(state): State<SharedFake>,
    Path(channel_id): Path<u64>,
    Query(query): Query<HistoryQuery>,
    headers: HeaderMap,
) -> Response {
    let mut state = lock(&state);
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }

    let limit = query.limit.unwrap_or(50).clamp(1, 100);
    state.page_requests.push(PageRequest {
        channel_id,
        limit,
        before: query.before,
        after: query.after,
    });

    let Some(history) = state.channels.get(&channel_id) else {
        return error(StatusCode::NOT_FOUND, "Unknown Channel", 10003);
    };

    let mut page: Vec<u64> = if let Some(after) = query.after {
        history
            .iter()
            .copied()
            .filter(|id| *id > after)
            .take(limit)
            .collect()
    } else {
        let older: Vec<u64> = history
            .iter()
            .copied()
            .filter(|id| query.before.map_or(true, |before| *id < before))
            .collect();
        older[older.len().saturating_sub(limit)..].to_vec()
    };
    page.reverse();

    let messages: Vec<Value> = page
        .into_iter()
        .map(|id| {
            json!({
                "id": id.to_string(),
                "channel_id": channel_id.to_string(),
                "content": format!("message {id}"),
                "type": 0
            })
        })
        .collect();
    Json(messages).into_response()
}

fn react(
    state: &SharedFake,
    headers: &HeaderMap,
    method: ReactionMethod,
    (channel_id, message_id, emoji): (u64, u64, String),
) -> Response {
    let mut state = lock(state);
    if let Err(response) = authorize(&state, headers) {
        return response;
    }
    state.reaction_attempts += 1;

    if state.rate_limits > 0 {
        state.rate_limits -= 1;
        let body = json!({
            "message": "You are being rate limited.",
            "retry_after": state.retry_after,
            "global": false
        });
        return (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    }
    if state.forbidden.contains(&message_id) {
        return error(StatusCode::FORBIDDEN, "Missing Permissions", 50013);
    }
    if state.missing.contains(&message_id) {
        return error(StatusCode::NOT_FOUND, "Unknown Message", 10008);
    }

    state.reactions.push(RecordedReaction {
        method,
        channel_id,
        message_id,
        emoji,
    });
    StatusCode::NO_CONTENT.into_response()
}

async fn add_reaction(
    State(state): State<SharedFake>,
    Path(path): Path<(u64, u64, String)>,
    headers: HeaderMap,
) -> Response {
    react(&state, &headers, ReactionMethod::Put, path)
}

async fn remove_reaction(
    State(state): State<SharedFake>,
    Path(path): Path<(u64, u64, String)>,
    headers: HeaderMap,
) -> Response {
    react(&state, &headers, ReactionMethod::Delete, path)
}
