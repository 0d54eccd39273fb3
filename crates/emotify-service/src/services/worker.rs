//! Reaction worker
//!
//! Runs one traversal: pulls messages from the paginator, applies every
//! resolved reaction to each one through the rate governor, and classifies
//! each response. Unauthorized and forbidden responses end the run, 429s are
//! retried by the governor, and any other failure skips that one reaction.

use std::sync::Arc;
use std::time::Duration;

use emotify_core::{
    ApiError, DiscordApi, Direction, FatalReason, Message, NoticeKind, ReactionId, ReactionMode,
    RunEnd, RunOutcome, Snowflake,
};
use tracing::{debug, info, instrument, warn};

use super::cancel::CancelFlag;
use super::events::EventSink;
use super::governor::{GovernorSettings, Paced, RateGovernor};
use super::paginator::{HistoryPaginator, Next};

/// Immutable parameters of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionTarget {
    pub channel_id: Snowflake,
    /// Applied to every message in this order
    pub reactions: Vec<ReactionId>,
    pub direction: Direction,
    pub rate_per_second: u32,
    /// Stop after this many messages; 0 means no limit
    pub max_messages: u64,
    pub mode: ReactionMode,
}

#[derive(Debug, Default)]
struct RunState {
    messages: u64,
    reactions: u64,
    failed: u64,
}

/// Executes a single run to completion
pub struct ReactionWorker {
    api: Arc<dyn DiscordApi>,
    target: ReactionTarget,
    governor: RateGovernor,
    page_delay: Duration,
    events: EventSink,
    cancel: CancelFlag,
}

impl ReactionWorker {
    pub fn new(
        api: Arc<dyn DiscordApi>,
        target: ReactionTarget,
        settings: GovernorSettings,
        page_delay: Duration,
        events: EventSink,
        cancel: CancelFlag,
    ) -> Self {
        let governor = RateGovernor::new(target.rate_per_second, settings);
        Self {
            api,
            target,
            governor,
            page_delay,
            events,
            cancel,
        }
    }

    /// Run until the history is exhausted, the limit is hit, the run is
    /// cancelled, or a fatal response arrives
    #[instrument(skip(self), fields(channel_id = %self.target.channel_id))]
    pub async fn run(self) -> RunOutcome {
        info!(
            direction = %self.target.direction,
            reactions = self.target.reactions.len(),
            rate = self.target.rate_per_second,
            max_messages = self.target.max_messages,
            clear = self.target.mode.is_clear(),
            "Run started"
        );

        let mut state = RunState::default();
        let end = self.traverse(&mut state).await;

        if end == RunEnd::Cancelled {
            self.events.status("Stopping…").await;
        }

        let outcome = RunOutcome {
            end,
            messages: state.messages,
            reactions: state.reactions,
            failed_reactions: state.failed,
        };
        info!(
            messages = outcome.messages,
            reactions = outcome.reactions,
            failed = outcome.failed_reactions,
            end = ?outcome.end,
            "Run finished"
        );
        self.events.status(outcome.summary()).await;
        outcome
    }

    async fn traverse(&self, state: &mut RunState) -> RunEnd {
        let mut paginator = HistoryPaginator::new(
            self.api.as_ref(),
            &self.governor,
            self.target.channel_id,
            self.target.direction,
            self.page_delay,
        );

        loop {
            let next = paginator.next(&self.cancel).await;
            self.report_throttles(paginator.take_throttled()).await;

            let message = match next {
                Next::Message(message) => message,
                Next::Finished => {
                    return RunEnd::Completed {
                        limit_reached: false,
                    }
                }
                Next::Cancelled => return RunEnd::Cancelled,
                Next::Failed(e) => return self.history_failed(e).await,
                Next::RateLimitExhausted => {
                    return self
                        .fatal(FatalReason::RateLimited, "Rate limited fetching messages")
                        .await
                }
            };

            if let Some(end) = self.react_to(&message, state).await {
                return end;
            }

            state.messages += 1;
            if self.target.max_messages > 0 && state.messages >= self.target.max_messages {
                info!(messages = state.messages, "Message limit reached");
                return RunEnd::Completed {
                    limit_reached: true,
                };
            }
        }
    }

    /// Apply every reaction to one message; `Some` ends the run
    async fn react_to(&self, message: &Message, state: &mut RunState) -> Option<RunEnd> {
        for reaction in &self.target.reactions {
            if self.cancel.is_cancelled() {
                return Some(RunEnd::Cancelled);
            }

            let api = self.api.as_ref();
            let channel_id = self.target.channel_id;
            let message_id = message.id;
            let mode = self.target.mode;
            let paced = self
                .governor
                .pace(
                    move || match mode {
                        ReactionMode::Add => api.add_reaction(channel_id, message_id, reaction),
                        ReactionMode::Remove => {
                            api.remove_reaction(channel_id, message_id, reaction)
                        }
                    },
                    &self.cancel,
                )
                .await;

            let (result, throttled) = match paced {
                Paced::Done { result, throttled } => (result, throttled),
                Paced::Cancelled => return Some(RunEnd::Cancelled),
                Paced::Exhausted { waited } => {
                    let detail = format!(
                        "Still rate limited after waiting {:.1}s",
                        waited.as_secs_f64()
                    );
                    return Some(self.fatal(FatalReason::RateLimited, detail).await);
                }
            };

            self.report_throttles(throttled).await;
            state.reactions += 1;
            self.events.progress(state.messages, state.reactions);

            match result {
                Ok(()) => {
                    debug!(message_id = %message_id, emoji = %reaction, "Reaction applied");
                }
                Err(e) if e.is_fatal() => {
                    let reason = fatal_reason(&e);
                    let detail = match reason {
                        FatalReason::Unauthorized => "Unauthorized",
                        _ => "Forbidden reacting",
                    };
                    return Some(self.fatal(reason, detail).await);
                }
                Err(e) => {
                    state.failed += 1;
                    warn!(
                        message_id = %message_id,
                        emoji = %reaction,
                        error = %e,
                        "Reaction failed, skipping"
                    );
                    self.events
                        .notice(
                            NoticeKind::ReactionFailed,
                            format!("{reaction} on message {message_id}: {e}"),
                        )
                        .await;
                }
            }
        }
        None
    }

    async fn history_failed(&self, error: ApiError) -> RunEnd {
        if error.is_fatal() {
            let reason = fatal_reason(&error);
            let detail = match reason {
                FatalReason::Unauthorized => "Unauthorized",
                _ => "Forbidden fetching messages",
            };
            return self.fatal(reason, detail).await;
        }

        self.events
            .notice(
                NoticeKind::HistoryUnavailable,
                format!("Could not fetch more messages: {error}"),
            )
            .await;
        RunEnd::Completed {
            limit_reached: false,
        }
    }

    async fn fatal(&self, reason: FatalReason, detail: impl Into<String>) -> RunEnd {
        let detail = detail.into();
        warn!(reason = ?reason, detail = %detail, "Run aborted");
        self.events.notice(reason.notice_kind(), detail).await;
        RunEnd::Fatal { reason }
    }

    async fn report_throttles(&self, count: u32) {
        if count == 0 {
            return;
        }
        let detail = if count == 1 {
            "Rate limited; resumed after 1 retry".to_string()
        } else {
            format!("Rate limited; resumed after {count} retries")
        };
        self.events
            .notice(NoticeKind::RateLimitedRecovered, detail)
            .await;
    }
}

fn fatal_reason(error: &ApiError) -> FatalReason {
    match error {
        ApiError::Unauthorized => FatalReason::Unauthorized,
        _ => FatalReason::Forbidden,
    }
}
