//! Test fixtures and data generators
//!
//! Provides reusable fake-server contents and run requests.

use emotify_core::{Direction, Snowflake};
use emotify_service::RunRequest;

use crate::fake_api::FakeDiscord;

/// Credential the fake accepts
pub const TEST_TOKEN: &str = "test-user-token";

/// Channel every fixture history lives in
pub const CHANNEL_ID: u64 = 4_000;

/// Guild the fixture emoji belong to
pub const GUILD_ID: u64 = 7_000;

/// Second guild, searched after the preferred one
pub const OTHER_GUILD_ID: u64 = 7_001;

/// Realistic snowflake ids: `count` messages a few seconds apart
pub fn history(count: u64) -> Vec<u64> {
    const FIRST: u64 = 1_100_000_000_000_000_000;
    (0..count).map(|i| FIRST + i * 4_194_304_000).collect()
}

/// A fake with one channel, two guilds and a couple of custom emoji
pub fn fake_with_history(count: u64) -> FakeDiscord {
    let mut fake = FakeDiscord {
        token: TEST_TOKEN.to_string(),
        retry_after: 0.05,
        ..FakeDiscord::default()
    };
    fake.guilds = vec![
        (GUILD_ID, "Home".to_string()),
        (OTHER_GUILD_ID, "Elsewhere".to_string()),
    ];
    fake.emojis
        .insert(GUILD_ID, vec![(77, "Parrot".to_string())]);
    fake.emojis
        .insert(OTHER_GUILD_ID, vec![(88, "blobwave".to_string())]);
    fake.channels.insert(CHANNEL_ID, history(count));
    fake
}

/// A run over the fixture channel
pub fn run_request(emoji: &str, direction: Direction) -> RunRequest {
    RunRequest {
        channel_id: Some(Snowflake::new(CHANNEL_ID)),
        guild_id: Some(Snowflake::new(GUILD_ID)),
        emoji: emoji.to_string(),
        direction,
        clear: false,
        rate_per_second: 500,
        max_messages: 0,
    }
}
