//! Reaction automation services
//!
//! Leaves first: the resolver and governor know nothing of runs, the
//! paginator knows nothing of reactions, the worker ties them together and
//! the engine owns the session and spawns runs.

pub mod cancel;
pub mod engine;
pub mod error;
pub mod events;
pub mod governor;
pub mod paginator;
pub mod resolver;
pub mod worker;

#[cfg(test)]
pub(crate) mod fake;

pub use cancel::CancelFlag;
pub use engine::{EngineSettings, ReactionEngine, RunHandle, RunRequest};
pub use error::StartError;
pub use events::EventSink;
pub use governor::{GovernorSettings, Paced, RateGovernor};
pub use paginator::{HistoryPaginator, Next};
pub use resolver::{EmojiResolver, GuildEmojiCache, Resolution};
pub use worker::{ReactionTarget, ReactionWorker};
