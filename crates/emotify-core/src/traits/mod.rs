//! Port traits - what the application layer needs from the outside world

mod discord_api;

pub use discord_api::{DiscordApi, MessageQuery, PAGE_SIZE};
