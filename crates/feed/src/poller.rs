//! Change-detecting endpoint poller.
//!
//! Periodically fetches the odds endpoint, hashes the raw body, and fans the
//! decoded snapshot out to registered listeners whenever the hash moves.
//! Failed cycles (fetch or listener) engage an exponential backoff that a
//! single success resets.

use livematch_core::{time, SnapshotListener, TrackerError};
use reqwest::Client;
use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Request timeout applied to every snapshot fetch.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(5);
/// Backoff the poller starts from and resets to.
pub const INITIAL_BACKOFF_MS: u64 = 1_000;
/// Upper bound the backoff never exceeds.
pub const MAX_BACKOFF_MS: u64 = 10_000;
/// Sentinel reported until the first successful fetch.
pub const NEVER_SUCCEEDED: u64 = u64::MAX;

/// Lifecycle states of the poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerStatus {
    Initializing,
    Polling,
    BackingOff,
    Error,
}

/// Counters kept across cycles for diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct PollerStats {
    pub cycles: u64,
    pub changes: u64,
    pub consecutive_failures: u32,
}

#[derive(Debug)]
struct PollerState {
    status: PollerStatus,
    last_checksum: Option<String>,
    last_success_ms: Option<i64>,
    backoff_ms: u64,
    stats: PollerStats,
    last_error: Option<String>,
}

impl PollerState {
    fn new() -> Self {
        Self {
            status: PollerStatus::Initializing,
            last_checksum: None,
            last_success_ms: None,
            backoff_ms: INITIAL_BACKOFF_MS,
            stats: PollerStats::default(),
            last_error: None,
        }
    }
}

struct PollerInner {
    http: Client,
    url: String,
    interval: Duration,
    listeners: RwLock<Vec<Arc<dyn SnapshotListener>>>,
    state: RwLock<PollerState>,
}

struct Runner {
    handle: JoinHandle<()>,
    shutdown: watch::Sender<bool>,
}

pub struct FeedPoller {
    inner: Arc<PollerInner>,
    runner: Mutex<Option<Runner>>,
}

impl FeedPoller {
    /// Creates a poller over `url` with the given inter-cycle sleep.
    /// A zero interval polls continuously.
    pub fn new(http: Client, url: impl Into<String>, interval: Duration) -> Self {
        Self {
            inner: Arc::new(PollerInner {
                http,
                url: url.into(),
                interval,
                listeners: RwLock::new(Vec::new()),
                state: RwLock::new(PollerState::new()),
            }),
            runner: Mutex::new(None),
        }
    }

    /// Registers a listener. Takes effect on the next notification round.
    pub async fn add_listener(&self, listener: Arc<dyn SnapshotListener>) {
        self.inner.listeners.write().await.push(listener);
    }

    /// Removes a previously registered listener; absent listeners are a
    /// no-op. Takes effect on the next notification round.
    pub async fn remove_listener(&self, listener: &Arc<dyn SnapshotListener>) {
        self.inner
            .listeners
            .write()
            .await
            .retain(|registered| !Arc::ptr_eq(registered, listener));
    }

    /// Starts the polling loop. Starting an already running poller is a
    /// no-op; a restart after `stop` begins with a fresh checksum and
    /// backoff, so an unchanged body is re-notified.
    pub async fn start(&self) {
        let mut runner = self.runner.lock().await;
        if runner.is_some() {
            return;
        }

        {
            let mut state = self.inner.state.write().await;
            state.status = PollerStatus::Polling;
            state.last_checksum = None;
            state.backoff_ms = INITIAL_BACKOFF_MS;
            state.stats.consecutive_failures = 0;
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let inner = self.inner.clone();
        let handle = tokio::spawn(async move { inner.run(shutdown_rx).await });

        *runner = Some(Runner {
            handle,
            shutdown: shutdown_tx,
        });
    }

    /// Stops the polling loop, interrupting any in-progress sleep and
    /// waiting for an in-flight cycle to finish. Idempotent.
    pub async fn stop(&self) {
        let runner = self.runner.lock().await.take();
        let Some(runner) = runner else {
            return;
        };

        let _ = runner.shutdown.send(true);
        if let Err(err) = runner.handle.await {
            warn!(error = %err, "poller task ended abnormally");
        }

        self.inner.state.write().await.status = PollerStatus::Initializing;
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> PollerStatus {
        self.inner.state.read().await.status
    }

    /// Milliseconds since the last successful fetch, or [`NEVER_SUCCEEDED`]
    /// before the first one.
    pub async fn time_since_last_success_ms(&self) -> u64 {
        match self.inner.state.read().await.last_success_ms {
            Some(ms) => (time::now_ms() - ms).max(0) as u64,
            None => NEVER_SUCCEEDED,
        }
    }

    /// Backoff that the next failed cycle would sleep for.
    pub async fn current_backoff_ms(&self) -> u64 {
        self.inner.state.read().await.backoff_ms
    }

    /// Cycle counters.
    pub async fn stats(&self) -> PollerStats {
        self.inner.state.read().await.stats
    }

    /// Checksum of the most recently observed body, as lowercase hex.
    pub async fn last_checksum(&self) -> Option<String> {
        self.inner.state.read().await.last_checksum.clone()
    }
}

impl PollerInner {
    async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        info!(url = %self.url, interval_ms = self.interval.as_millis() as u64, "feed poller started");

        loop {
            if *shutdown.borrow() {
                break;
            }

            let sleep_ms = match self.run_cycle().await {
                Ok(()) => self.interval.as_millis() as u64,
                Err(err) => self.handle_cycle_error(&err).await,
            };

            if sleep_ms == 0 {
                continue;
            }

            tokio::select! {
                () = tokio::time::sleep(Duration::from_millis(sleep_ms)) => {}
                _ = shutdown.changed() => break,
            }
        }

        info!(url = %self.url, "feed poller stopped");
    }

    /// Fetches once and notifies listeners when the body changed.
    async fn run_cycle(&self) -> Result<(), TrackerError> {
        {
            let mut state = self.state.write().await;
            state.status = PollerStatus::Polling;
            state.stats.cycles += 1;
        }

        let response = self
            .http
            .get(&self.url)
            .timeout(FETCH_TIMEOUT)
            .send()
            .await
            .map_err(crate::fetch_error)?;

        if !response.status().is_success() {
            return Err(TrackerError::FetchFailed(format!(
                "odds endpoint returned {}",
                response.status()
            )));
        }

        let body = response.bytes().await.map_err(crate::fetch_error)?;
        let checksum = sha256_hex(&body);

        let changed = {
            let state = self.state.read().await;
            state.last_checksum.as_deref() != Some(checksum.as_str())
        };

        if changed {
            // The checksum advances before fan-out so a failing listener
            // does not cause the same body to be replayed next cycle.
            {
                let mut state = self.state.write().await;
                state.last_checksum = Some(checksum);
                state.stats.changes += 1;
            }

            let payload = String::from_utf8(body.to_vec())
                .map_err(|err| TrackerError::InvalidResponse(err.to_string()))?;

            let listeners: Vec<Arc<dyn SnapshotListener>> =
                self.listeners.read().await.iter().cloned().collect();

            debug!(listeners = listeners.len(), bytes = payload.len(), "snapshot changed, notifying");

            for listener in listeners {
                listener.on_change(&self.url, &payload).await?;
            }
        } else {
            debug!("snapshot unchanged");
        }

        let mut state = self.state.write().await;
        state.status = PollerStatus::Polling;
        state.last_success_ms = Some(time::now_ms());
        state.backoff_ms = INITIAL_BACKOFF_MS;
        state.stats.consecutive_failures = 0;
        state.last_error = None;
        Ok(())
    }

    /// Records a failed cycle and returns the backoff to sleep for.
    async fn handle_cycle_error(&self, err: &TrackerError) -> u64 {
        let backoff_ms = {
            let mut state = self.state.write().await;
            state.status = PollerStatus::Error;
            state.last_error = Some(err.to_string());
            state.stats.consecutive_failures += 1;
            state.backoff_ms = (state.backoff_ms * 2).min(MAX_BACKOFF_MS);
            state.backoff_ms
        };

        warn!(error = %err, backoff_ms, "poll cycle failed");

        self.state.write().await.status = PollerStatus::BackingOff;
        backoff_ms
    }
}

/// SHA-256 of `bytes` as lowercase hex.
fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(out, "{byte:02x}");
    }
    out
}
