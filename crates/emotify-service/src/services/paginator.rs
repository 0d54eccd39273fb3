//! History paginator
//!
//! Produces a container's messages one at a time in chronological or
//! reverse-chronological order. The history endpoint only walks backward
//! from "now" or forward from a known id, so oldest-first traversal first
//! seeks backward to find the oldest id, then replays forward from it.
//! Both phases live in one state machine so cancellation and error handling
//! are the same everywhere.

use std::collections::VecDeque;
use std::time::Duration;

use emotify_core::{ApiError, DiscordApi, Direction, Message, MessageQuery, Snowflake, PAGE_SIZE};
use tokio::time::sleep;
use tracing::{debug, warn};

use super::cancel::CancelFlag;
use super::governor::{Paced, RateGovernor};

/// Traversal position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Newest-first: pages older than `before` (newest page when `None`)
    Backward { before: Option<Snowflake> },
    /// Oldest-first, phase 1: walk back to find the oldest id
    Seek {
        before: Option<Snowflake>,
        oldest: Option<Snowflake>,
    },
    /// Oldest-first, phase 2: pages newer than `after`
    Replay { after: Snowflake },
    /// No more pages
    Exhausted,
}

/// What the paginator produced
#[derive(Debug)]
pub enum Next {
    Message(Message),
    /// The history has no more messages
    Finished,
    /// The cancel flag was observed
    Cancelled,
    /// A page fetch failed with a final error; traversal is over
    Failed(ApiError),
    /// A page fetch stayed throttled past the wait cap
    RateLimitExhausted,
}

/// Pull-based message sequence over one container
pub struct HistoryPaginator<'a> {
    api: &'a dyn DiscordApi,
    governor: &'a RateGovernor,
    channel_id: Snowflake,
    page_delay: Duration,
    phase: Phase,
    buffer: VecDeque<Message>,
    pages: u32,
    throttled: u32,
}

impl<'a> HistoryPaginator<'a> {
    pub fn new(
        api: &'a dyn DiscordApi,
        governor: &'a RateGovernor,
        channel_id: Snowflake,
        direction: Direction,
        page_delay: Duration,
    ) -> Self {
        let phase = match direction {
            Direction::NewestFirst => Phase::Backward { before: None },
            Direction::OldestFirst => Phase::Seek {
                before: None,
                oldest: None,
            },
        };
        Self {
            api,
            governor,
            channel_id,
            page_delay,
            phase,
            buffer: VecDeque::new(),
            pages: 0,
            throttled: 0,
        }
    }

    /// 429s absorbed by page fetches since the last call
    pub fn take_throttled(&mut self) -> u32 {
        std::mem::take(&mut self.throttled)
    }

    /// Produce the next message
    pub async fn next(&mut self, cancel: &CancelFlag) -> Next {
        loop {
            if cancel.is_cancelled() {
                return Next::Cancelled;
            }
            if let Some(message) = self.buffer.pop_front() {
                return Next::Message(message);
            }

            match self.phase {
                Phase::Exhausted => return Next::Finished,

                Phase::Backward { before } => {
                    let mut page = match self.fetch(MessageQuery::before(before), cancel).await {
                        Ok(page) => page,
                        Err(next) => return next,
                    };
                    if let Some(before) = before {
                        page.retain(|m| m.id < before);
                    }
                    page.sort_unstable_by(|a, b| b.id.cmp(&a.id));

                    self.phase = match page.last() {
                        Some(oldest) => Phase::Backward {
                            before: Some(oldest.id),
                        },
                        None => Phase::Exhausted,
                    };
                    self.buffer.extend(page);
                }

                Phase::Seek { before, oldest } => {
                    let page = match self.fetch(MessageQuery::before(before), cancel).await {
                        Ok(page) => page,
                        Err(next) => return next,
                    };
                    let page_oldest = page.iter().map(|m| m.id).min();
                    let oldest = oldest.into_iter().chain(page_oldest).min();
                    let reached_start = page.len() < PAGE_SIZE as usize
                        || page_oldest.is_none()
                        || page_oldest == before;

                    self.phase = if reached_start {
                        match oldest {
                            Some(oldest) => {
                                debug!(oldest = %oldest, "Found start of history");
                                Phase::Replay {
                                    after: oldest.pred(),
                                }
                            }
                            None => Phase::Exhausted,
                        }
                    } else {
                        Phase::Seek {
                            before: page_oldest,
                            oldest,
                        }
                    };
                }

                Phase::Replay { after } => {
                    let mut page = match self.fetch(MessageQuery::after(after), cancel).await {
                        Ok(page) => page,
                        Err(next) => return next,
                    };
                    page.retain(|m| m.id > after);
                    page.sort_unstable_by_key(|m| m.id);

                    self.phase = match page.last() {
                        Some(newest) => Phase::Replay { after: newest.id },
                        None => Phase::Exhausted,
                    };
                    self.buffer.extend(page);
                }
            }
        }
    }

    /// Fetch one page, spacing it from the previous one
    async fn fetch(
        &mut self,
        query: MessageQuery,
        cancel: &CancelFlag,
    ) -> Result<Vec<Message>, Next> {
        if self.pages > 0 && !self.page_delay.is_zero() {
            sleep(self.page_delay).await;
            if cancel.is_cancelled() {
                return Err(Next::Cancelled);
            }
        }
        self.pages += 1;

        let api = self.api;
        let channel_id = self.channel_id;
        let paced = self
            .governor
            .retry(move || api.channel_messages(channel_id, query), cancel)
            .await;

        match paced {
            Paced::Done { result, throttled } => {
                self.throttled += throttled;
                match result {
                    Ok(page) => {
                        debug!(
                            channel_id = %channel_id,
                            before = ?query.before,
                            after = ?query.after,
                            count = page.len(),
                            "Fetched history page"
                        );
                        Ok(page)
                    }
                    Err(e) => {
                        warn!(channel_id = %channel_id, error = %e, "History page fetch failed");
                        self.phase = Phase::Exhausted;
                        Err(Next::Failed(e))
                    }
                }
            }
            Paced::Cancelled => Err(Next::Cancelled),
            Paced::Exhausted { .. } => {
                self.phase = Phase::Exhausted;
                Err(Next::RateLimitExhausted)
            }
        }
    }
}
