// ── Coordinator ──
//
// Owns the Fetcher and the latest Snapshot. Runs fetch+normalize cycles on
// demand or from a background poll loop and publishes each successful
// result with a single pointer swap.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use yalehub_api::Credentials;

use crate::config::PanelConfig;
use crate::error::RefreshError;
use crate::fetcher::Fetcher;
use crate::model::{Classified, ContactState, LockReading, SmokeState, Snapshot};
use crate::normalize::{NormalizeSettings, normalize};

// ── ConnectionState ──────────────────────────────────────────────

/// Health of the refresh cycle, observable by consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// No cycle has completed yet.
    Idle,
    /// Last cycle succeeded.
    Connected,
    /// Last cycles failed transiently; the previous snapshot is still served.
    Degraded { consecutive_failures: u32 },
    /// Credentials or session rejected. Polling stops; a successful
    /// [`Coordinator::reauthenticate`] resumes it.
    AuthFailed,
    /// Poll loop stopped by the caller.
    Stopped,
}

// ── Coordinator ──────────────────────────────────────────────────

/// Entry point for consumers.
///
/// Cheaply cloneable via `Arc<CoordinatorInner>`. At most one refresh
/// cycle runs at a time; readers always see either the previous or the
/// new snapshot, never a partial one.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    config: PanelConfig,
    settings: NormalizeSettings,
    fetcher: Mutex<Fetcher>,
    latest: ArcSwapOption<Snapshot>,
    snapshot_tx: watch::Sender<Option<Arc<Snapshot>>>,
    connection_state: watch::Sender<ConnectionState>,
    poll_task: Mutex<Option<(CancellationToken, JoinHandle<()>)>>,
}

impl Coordinator {
    /// Create a coordinator. Does NOT contact the cloud -- call
    /// [`refresh()`](Self::refresh) or [`start()`](Self::start).
    pub fn new(config: PanelConfig) -> Self {
        let (snapshot_tx, _) = watch::channel(None);
        let (connection_state, _) = watch::channel(ConnectionState::Idle);

        Self {
            inner: Arc::new(CoordinatorInner {
                settings: config.normalize_settings(),
                fetcher: Mutex::new(Fetcher::new(&config)),
                config,
                latest: ArcSwapOption::empty(),
                snapshot_tx,
                connection_state,
                poll_task: Mutex::new(None),
            }),
        }
    }

    // ── Refresh cycle ────────────────────────────────────────────

    /// Run one fetch+normalize cycle and publish the result.
    ///
    /// Concurrent callers are serialized on the fetcher. On failure the
    /// previously published snapshot stays in place.
    pub async fn refresh(&self) -> Result<Arc<Snapshot>, RefreshError> {
        let mut fetcher = self.inner.fetcher.lock().await;

        let outcome = match fetcher.fetch().await {
            Ok(raw) => normalize(&raw, &self.inner.settings).map_err(RefreshError::from),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                self.inner.latest.store(Some(Arc::clone(&snapshot)));
                self.inner.snapshot_tx.send_replace(Some(Arc::clone(&snapshot)));
                self.inner
                    .connection_state
                    .send_replace(ConnectionState::Connected);
                debug!(
                    devices = snapshot.device_count(),
                    arm_status = %snapshot.arm_status,
                    "snapshot published"
                );
                Ok(snapshot)
            }
            Err(e) => {
                self.record_failure(&e);
                Err(e)
            }
        }
    }

    fn record_failure(&self, err: &RefreshError) {
        let next = if err.requires_reauth() {
            ConnectionState::AuthFailed
        } else {
            let consecutive_failures = match *self.inner.connection_state.borrow() {
                ConnectionState::Degraded {
                    consecutive_failures,
                } => consecutive_failures.saturating_add(1),
                _ => 1,
            };
            ConnectionState::Degraded {
                consecutive_failures,
            }
        };
        self.inner.connection_state.send_replace(next);
    }

    /// Drop the current session (optionally swapping credentials) and run
    /// a fresh cycle, which logs in again.
    ///
    /// If a poll loop ended on an auth failure, it is restarted once the
    /// new session succeeds.
    pub async fn reauthenticate(
        &self,
        credentials: Option<Credentials>,
    ) -> Result<Arc<Snapshot>, RefreshError> {
        self.inner.fetcher.lock().await.reauthenticate(credentials);
        info!("re-authenticating");
        let snapshot = self.refresh().await?;
        self.resume_polling().await;
        Ok(snapshot)
    }

    // ── Background polling ───────────────────────────────────────

    /// Run an initial refresh, then poll on the configured interval until
    /// [`stop()`](Self::stop) or an auth failure.
    ///
    /// An initial auth failure is returned and no loop is spawned; an
    /// initial transient failure is logged and polling starts anyway.
    pub async fn start(&self) -> Result<(), RefreshError> {
        self.stop_task().await;

        match self.refresh().await {
            Ok(_) => {}
            Err(e) if e.requires_reauth() => return Err(e),
            Err(e) => warn!(error = %e, "initial refresh failed"),
        }

        *self.inner.poll_task.lock().await = Some(self.spawn_poll_task());
        info!(
            interval_secs = self.inner.config.poll_interval().as_secs(),
            "polling started"
        );
        Ok(())
    }

    fn spawn_poll_task(&self) -> (CancellationToken, JoinHandle<()>) {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(poll_task(
            self.clone(),
            self.inner.config.poll_interval(),
            cancel.clone(),
        ));
        (cancel, handle)
    }

    /// Respawn a poll loop that ended on an auth failure. `stop()` takes the
    /// task out before cancelling it, so a cancelled token still in place
    /// was cancelled by the loop itself.
    async fn resume_polling(&self) {
        let mut task = self.inner.poll_task.lock().await;
        if !task.as_ref().is_some_and(|(cancel, _)| cancel.is_cancelled()) {
            return;
        }
        if let Some((_, handle)) = task.take() {
            let _ = handle.await;
        }
        *task = Some(self.spawn_poll_task());
        info!("polling resumed");
    }

    /// Cancel the poll loop and wait for it to finish.
    pub async fn stop(&self) {
        self.stop_task().await;
        self.inner
            .connection_state
            .send_replace(ConnectionState::Stopped);
        debug!("polling stopped");
    }

    async fn stop_task(&self) {
        let task = self.inner.poll_task.lock().await.take();
        if let Some((cancel, handle)) = task {
            cancel.cancel();
            let _ = handle.await;
        }
    }

    /// Whether a poll loop is currently running.
    pub async fn is_polling(&self) -> bool {
        self.inner
            .poll_task
            .lock()
            .await
            .as_ref()
            .is_some_and(|(cancel, handle)| !cancel.is_cancelled() && !handle.is_finished())
    }

    // ── State observation ────────────────────────────────────────

    /// Receive every newly published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<Snapshot>>> {
        self.inner.snapshot_tx.subscribe()
    }

    /// Subscribe to connection state changes.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    // ── Snapshot accessors ───────────────────────────────────────

    /// Latest published snapshot, if any cycle has succeeded.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.inner.latest.load_full()
    }

    pub fn locks(&self) -> Vec<Classified<LockReading>> {
        self.snapshot().map(|s| s.locks.clone()).unwrap_or_default()
    }

    pub fn contacts(&self) -> Vec<Classified<ContactState>> {
        self.snapshot().map(|s| s.contacts.clone()).unwrap_or_default()
    }

    pub fn temperature_sensors(&self) -> Vec<Classified<f64>> {
        self.snapshot()
            .map(|s| s.temperature_sensors.clone())
            .unwrap_or_default()
    }

    pub fn smoke_detectors(&self) -> Vec<Classified<SmokeState>> {
        self.snapshot()
            .map(|s| s.smoke_detectors.clone())
            .unwrap_or_default()
    }

    pub fn lock_state(&self, address: &str) -> Option<LockReading> {
        self.snapshot()?.lock(address)
    }

    pub fn contact_state(&self, address: &str) -> Option<ContactState> {
        self.snapshot()?.contact(address)
    }

    pub fn temperature(&self, address: &str) -> Option<f64> {
        self.snapshot()?.temperature(address)
    }

    pub fn smoke_state(&self, address: &str) -> Option<SmokeState> {
        self.snapshot()?.smoke(address)
    }
}

// ── Background task ──────────────────────────────────────────────

/// Periodic refresh. Cycles never overlap: each tick awaits the full
/// refresh before the next one is taken.
async fn poll_task(coordinator: Coordinator, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                match coordinator.refresh().await {
                    Ok(_) => {}
                    Err(e) if e.requires_reauth() => {
                        warn!(error = %e, "authentication rejected; polling stopped");
                        cancel.cancel();
                        break;
                    }
                    Err(e) => warn!(error = %e, "periodic refresh failed"),
                }
            }
        }
    }
}
