//! Rate governor
//!
//! Local pacing for reaction calls, composed with server-issued throttling.
//! A paced call takes at least `1 / rate` seconds: after the response
//! returns, the remainder of the spacing is slept. A 429 suspends local
//! pacing: the governor sleeps the server's delay plus a safety margin and
//! reissues the same call.

use std::future::Future;
use std::time::Duration;

use emotify_common::WorkerConfig;
use emotify_core::{ApiError, ApiResult};
use tokio::time::{sleep, Instant};
use tracing::warn;

use super::cancel::CancelFlag;

/// Throttle handling knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GovernorSettings {
    /// Added to every server-specified delay
    pub retry_margin: Duration,
    /// Used when a 429 carries no parseable delay
    pub default_retry_after: Duration,
    /// Total throttle wait allowed for one operation; unbounded when `None`
    pub max_throttle_wait: Option<Duration>,
}

impl Default for GovernorSettings {
    fn default() -> Self {
        Self {
            retry_margin: Duration::from_millis(100),
            default_retry_after: Duration::from_secs(1),
            max_throttle_wait: None,
        }
    }
}

impl From<&WorkerConfig> for GovernorSettings {
    fn from(config: &WorkerConfig) -> Self {
        Self {
            retry_margin: config.retry_margin(),
            default_retry_after: config.default_retry_after(),
            max_throttle_wait: config.max_throttle_wait(),
        }
    }
}

/// Result of a governed operation
#[derive(Debug)]
pub enum Paced<T> {
    /// The call reached a final (non-429) response
    Done {
        result: ApiResult<T>,
        /// How many 429s were absorbed on the way
        throttled: u32,
    },
    /// Cancellation was observed between retries
    Cancelled,
    /// The next throttle wait would exceed `max_throttle_wait`
    Exhausted { waited: Duration },
}

/// Paces operations to a configured rate
#[derive(Debug, Clone)]
pub struct RateGovernor {
    spacing: Duration,
    settings: GovernorSettings,
}

impl RateGovernor {
    /// Create a governor for `rate_per_second` operations (minimum 1)
    pub fn new(rate_per_second: u32, settings: GovernorSettings) -> Self {
        Self {
            spacing: Duration::from_secs(1) / rate_per_second.max(1),
            settings,
        }
    }

    /// Minimum time between the starts of two paced operations
    pub fn spacing(&self) -> Duration {
        self.spacing
    }

    pub fn settings(&self) -> &GovernorSettings {
        &self.settings
    }

    /// Sleep required after a 429
    pub fn retry_delay(&self, retry_after: Option<Duration>) -> Duration {
        retry_after.unwrap_or(self.settings.default_retry_after) + self.settings.retry_margin
    }

    /// Run a reaction call under local pacing and 429 retry
    pub async fn pace<T, F, Fut>(&self, op: F, cancel: &CancelFlag) -> Paced<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ApiResult<T>>,
    {
        self.run(op, cancel, true).await
    }

    /// Run a call under 429 retry only (history pages use their own delay)
    pub async fn retry<T, F, Fut>(&self, op: F, cancel: &CancelFlag) -> Paced<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ApiResult<T>>,
    {
        self.run(op, cancel, false).await
    }

    async fn run<T, F, Fut>(&self, mut op: F, cancel: &CancelFlag, paced: bool) -> Paced<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ApiResult<T>>,
    {
        let mut throttled = 0u32;
        let mut waited = Duration::ZERO;

        loop {
            let started = Instant::now();
            let result = op().await;

            let retry_after = match result {
                Err(ApiError::RateLimited { retry_after }) => retry_after,
                result => {
                    // A retried call is not paced again
                    if paced && throttled == 0 {
                        let elapsed = started.elapsed();
                        if elapsed < self.spacing {
                            sleep(self.spacing - elapsed).await;
                        }
                    }
                    return Paced::Done { result, throttled };
                }
            };

            let delay = self.retry_delay(retry_after);
            if self
                .settings
                .max_throttle_wait
                .is_some_and(|cap| waited + delay > cap)
            {
                warn!(waited_ms = waited.as_millis() as u64, "Throttle wait cap exceeded");
                return Paced::Exhausted { waited };
            }

            throttled += 1;
            waited += delay;
            warn!(
                delay_ms = delay.as_millis() as u64,
                attempt = throttled,
                "Rate limited, retrying after delay"
            );
            sleep(delay).await;

            if cancel.is_cancelled() {
                return Paced::Cancelled;
            }
        }
    }
}
