//! # emotify-service
//!
//! Application layer: resolves emoji tokens, paces reaction calls, walks a
//! container's history, and runs the reaction worker on a background task.

pub mod services;

pub use services::{
    CancelFlag, EmojiResolver, EngineSettings, EventSink, GovernorSettings, GuildEmojiCache,
    HistoryPaginator, Next, Paced, RateGovernor, ReactionEngine, ReactionTarget, ReactionWorker,
    Resolution, RunHandle, RunRequest, StartError,
};
