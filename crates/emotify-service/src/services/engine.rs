//! Reaction engine
//!
//! Owns one connected session: the API client, the known guild list and the
//! emoji resolver. Validates run requests, resolves emoji tokens up front,
//! and spawns at most one background run at a time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use emotify_common::{AppError, AppResult, WorkerConfig};
use emotify_core::{
    DiscordApi, Direction, Guild, NoticeKind, ReactionMode, RunEvent, RunOutcome, Snowflake,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

use super::cancel::CancelFlag;
use super::error::StartError;
use super::events::EventSink;
use super::governor::GovernorSettings;
use super::resolver::{parse_tokens, EmojiResolver};
use super::worker::{ReactionTarget, ReactionWorker};

/// Session-wide run settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    /// Pause between history page fetches
    pub page_delay: Duration,
    pub governor: GovernorSettings,
    /// Highest accepted reactions-per-second
    pub max_rate: u32,
    /// Capacity of each run's event channel
    pub event_buffer: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            page_delay: Duration::from_millis(200),
            governor: GovernorSettings::default(),
            max_rate: 20,
            event_buffer: 256,
        }
    }
}

impl From<&WorkerConfig> for EngineSettings {
    fn from(config: &WorkerConfig) -> Self {
        Self {
            page_delay: config.page_delay(),
            governor: GovernorSettings::from(config),
            max_rate: config.max_rate,
            event_buffer: config.event_buffer,
        }
    }
}

/// Inbound parameters of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    /// Channel or DM thread to walk
    pub channel_id: Option<Snowflake>,
    /// Guild whose custom emoji are preferred when resolving shortcodes
    pub guild_id: Option<Snowflake>,
    /// Raw comma/whitespace separated emoji tokens
    pub emoji: String,
    pub direction: Direction,
    pub clear: bool,
    pub rate_per_second: u32,
    /// 0 means no limit
    pub max_messages: u64,
}

/// Handle to a spawned run
pub struct RunHandle {
    /// Everything the run reports; closes when the run ends
    pub events: mpsc::Receiver<RunEvent>,
    cancel: CancelFlag,
    task: JoinHandle<RunOutcome>,
}

impl RunHandle {
    /// Ask the run to stop at its next checkpoint
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// A flag that cancels this run, for handing to other tasks
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Wait for the run to finish
    ///
    /// Undrained events are discarded so the run never waits on a full
    /// channel nobody reads.
    pub async fn join(self) -> AppResult<RunOutcome> {
        let Self { events, task, .. } = self;
        drop(events);
        task.await.map_err(|e| {
            error!(error = %e, "Run task failed");
            AppError::internal(e)
        })
    }
}

/// Clears the running flag when the run task ends, even by panic
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// One connected session
pub struct ReactionEngine {
    api: Arc<dyn DiscordApi>,
    guilds: Vec<Guild>,
    resolver: EmojiResolver,
    settings: EngineSettings,
    running: Arc<AtomicBool>,
}

impl ReactionEngine {
    /// Verify the credential and load the guild list
    ///
    /// Unauthorized, forbidden and timed-out requests abort the connect.
    /// Other failures leave the session connected with no known guilds.
    #[instrument(skip_all)]
    pub async fn connect(api: Arc<dyn DiscordApi>, settings: EngineSettings) -> AppResult<Self> {
        let guilds = match api.current_guilds().await {
            Ok(guilds) => guilds,
            Err(e) if e.is_fatal() || e.is_timeout() => {
                error!(error = %e, "Connect failed");
                return Err(AppError::from(e));
            }
            Err(e) => {
                warn!(error = %e, "Could not load guild list; custom emoji lookup disabled");
                Vec::new()
            }
        };

        info!(guilds = guilds.len(), "Connected");
        let resolver = EmojiResolver::new(guilds.iter().map(|g| g.id).collect());
        Ok(Self {
            api,
            guilds,
            resolver,
            settings,
            running: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn guilds(&self) -> &[Guild] {
        &self.guilds
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn resolver(&self) -> &EmojiResolver {
        &self.resolver
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Validate a request and spawn its run
    #[instrument(skip(self, request), fields(channel_id = ?request.channel_id))]
    pub async fn start(&mut self, request: RunRequest) -> Result<RunHandle, StartError> {
        if self.is_running() {
            return Err(StartError::AlreadyRunning);
        }
        let channel_id = request.channel_id.ok_or(StartError::NoContainer)?;
        if parse_tokens(&request.emoji).is_empty() {
            return Err(StartError::NoEmoji);
        }
        let max = self.settings.max_rate;
        if !(1..=max).contains(&request.rate_per_second) {
            return Err(StartError::InvalidRate {
                rate: request.rate_per_second,
                max,
            });
        }

        let resolution = self
            .resolver
            .resolve_all(self.api.as_ref(), &request.emoji, request.guild_id)
            .await;
        if resolution.resolved.is_empty() {
            warn!(tokens = ?resolution.unresolved, "No emoji resolved");
            return Err(StartError::NoneResolved {
                tokens: resolution.unresolved,
            });
        }

        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(StartError::AlreadyRunning);
        }
        let guard = RunningGuard(Arc::clone(&self.running));

        let target = ReactionTarget {
            channel_id,
            reactions: resolution.resolved,
            direction: request.direction,
            rate_per_second: request.rate_per_second,
            max_messages: request.max_messages,
            mode: ReactionMode::from_clear(request.clear),
        };
        let unresolved = resolution.unresolved;
        let cancel = CancelFlag::new();
        let (events, rx) = EventSink::channel(self.settings.event_buffer, cancel.clone());
        let worker = ReactionWorker::new(
            Arc::clone(&self.api),
            target,
            self.settings.governor,
            self.settings.page_delay,
            events.clone(),
            cancel.clone(),
        );

        let task = tokio::spawn(async move {
            events.running(true).await;
            events.status("Starting…").await;
            if !unresolved.is_empty() {
                let list = unresolved.join(", ");
                events
                    .notice(NoticeKind::TokenUnresolved, list.clone())
                    .await;
                events
                    .status(format!("Some not found: {list}; continuing with others"))
                    .await;
            }

            let outcome = worker.run().await;

            drop(guard);
            events.running(false).await;
            events.status("Idle").await;
            outcome
        });

        Ok(RunHandle {
            events: rx,
            cancel,
            task,
        })
    }
}
