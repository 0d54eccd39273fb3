//! Test helpers for integration tests
//!
//! Provides the fake server lifecycle, a client and engine wired to it, and
//! run event collection.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use emotify_common::AppResult;
use emotify_core::{DiscordApi, RunEvent, RunOutcome};
use emotify_rest::{RestClient, RestClientConfig};
use emotify_service::{EngineSettings, GovernorSettings, ReactionEngine, RunHandle};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::fake_api::{lock, router, FakeDiscord, SharedFake};

/// Fake API server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub state: SharedFake,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start serving `fake` on an ephemeral port
    pub async fn start(fake: FakeDiscord) -> Result<Self> {
        let state: SharedFake = Arc::new(Mutex::new(fake));
        let app = router(Arc::clone(&state));

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(Self {
            addr,
            state,
            _handle: handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// A REST client for this server
    pub fn client(&self, token: &str) -> AppResult<RestClient> {
        RestClient::new(RestClientConfig {
            api_base: self.base_url(),
            token: token.to_string(),
            timeout: Duration::from_secs(5),
            user_agent: "emotify-integration".to_string(),
        })
    }

    /// Connect an engine with fast test settings
    pub async fn engine(&self, token: &str) -> AppResult<ReactionEngine> {
        let api: Arc<dyn DiscordApi> = Arc::new(self.client(token)?);
        ReactionEngine::connect(api, test_settings()).await
    }

    /// Inspect or modify the fake's state
    pub fn with_state<T>(&self, f: impl FnOnce(&mut FakeDiscord) -> T) -> T {
        f(&mut lock(&self.state))
    }
}

/// Engine settings without page delays and with short throttle waits
pub fn test_settings() -> EngineSettings {
    EngineSettings {
        page_delay: Duration::ZERO,
        governor: GovernorSettings {
            retry_margin: Duration::from_millis(10),
            default_retry_after: Duration::from_millis(50),
            max_throttle_wait: None,
        },
        max_rate: 1_000,
        event_buffer: 64,
    }
}

/// Drain a run's events, then wait for its outcome
pub async fn collect_run(mut handle: RunHandle) -> Result<(RunOutcome, Vec<RunEvent>)> {
    let mut events = Vec::new();
    while let Some(event) = handle.events.recv().await {
        events.push(event);
    }
    let outcome = handle.join().await?;
    Ok((outcome, events))
}

/// Check that ids are strictly increasing
pub fn strictly_increasing(ids: &[u64]) -> bool {
    ids.windows(2).all(|w| w[0] < w[1])
}
