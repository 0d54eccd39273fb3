//! # emotify-core
//!
//! Domain layer containing ids, entities, the remote API port, and run events.
//! This crate has zero dependencies on infrastructure (HTTP client, runtime, etc.).

pub mod entities;
pub mod error;
pub mod events;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{Guild, GuildEmoji, Message};
pub use error::{ApiError, ApiResult, ErrorClass};
pub use events::{FatalReason, Notice, NoticeKind, Progress, RunEnd, RunEvent, RunOutcome};
pub use traits::{DiscordApi, MessageQuery, PAGE_SIZE};
pub use value_objects::{
    Direction, DirectionParseError, ReactionId, ReactionMode, Snowflake, SnowflakeParseError,
};
