//! Periodic trip status refresh loop.
//!
//! [`TripStatusService`] owns a background task that recomputes a
//! [`TripStatus`] once per tick and pushes it to a
//! [`TripNotificationSink`]. The lifecycle is strictly one way:
//!
//! ```text
//! Idle -> Running -> Stopped
//! ```
//!
//! A stopped service is never resurrected. Calling [`TripStatusService::stop`]
//! before the first start pins the state to `Stopped`, so a later start is
//! rejected too. The sink's `stop` callback runs exactly once, after the last
//! update, regardless of whether the loop ends through `stop` or through
//! dropping the service.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::RefreshConfig;
use crate::notification::{RouteProgress, TripNotificationSink, TripStatus};

const STATE_IDLE: u8 = 0;
const STATE_RUNNING: u8 = 1;
const STATE_STOPPED: u8 = 2;

/// Drives a foreground trip notification by refreshing it on a fixed cadence.
///
/// The service is cheap to share behind an `Arc`; all methods take `&self`.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use nav_guidance::{RefreshConfig, TripNotificationSink, TripStatusService};
///
/// # async fn run(sink: Arc<dyn TripNotificationSink>) {
/// let service = TripStatusService::new(sink, &RefreshConfig::default());
/// assert!(service.start().await);
/// // ... trip in progress, sink receives one update per tick ...
/// assert!(service.stop().await);
/// # }
/// ```
pub struct TripStatusService {
    sink: Arc<dyn TripNotificationSink>,
    interval: Duration,
    state: AtomicU8,
    token: CancellationToken,
    ticker: Mutex<Option<JoinHandle<()>>>,
    progress: Arc<RwLock<Option<RouteProgress>>>,
}

impl TripStatusService {
    /// Creates an idle service that will push updates to `sink` every
    /// `config.interval` once started.
    pub fn new(sink: Arc<dyn TripNotificationSink>, config: &RefreshConfig) -> Self {
        Self {
            sink,
            interval: config.interval,
            state: AtomicU8::new(STATE_IDLE),
            token: CancellationToken::new(),
            ticker: Mutex::new(None),
            progress: Arc::new(RwLock::new(None)),
        }
    }

    /// Starts the refresh loop.
    ///
    /// The first update is pushed immediately, then one per tick. The sink's
    /// `start_foreground` callback runs before the first update; if it fails
    /// the error is logged and the loop starts anyway.
    ///
    /// # Returns
    ///
    /// `true` if the loop was started, `false` if the service was already
    /// running or has been stopped. Only the first call can return `true`.
    pub async fn start(&self) -> bool {
        if self
            .state
            .compare_exchange(STATE_IDLE, STATE_RUNNING, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("trip status refresh not started: already running or stopped");
            return false;
        }

        // Hold the ticker slot through startup so a concurrent stop() waits
        // for the handle instead of finding the slot empty.
        let mut ticker = self.ticker.lock().await;

        if let Err(e) = self.sink.start_foreground().await {
            tracing::warn!(
                sink = self.sink.name(),
                error = %e,
                "foreground start rejected by sink, refresh loop starts anyway"
            );
        }

        *ticker = Some(spawn_refresh_loop(
            Arc::clone(&self.sink),
            self.interval,
            self.token.clone(),
            Arc::clone(&self.progress),
        ));
        drop(ticker);

        tracing::info!(
            interval_ms = self.interval.as_millis() as u64,
            sink = self.sink.name(),
            "trip status refresh started"
        );
        true
    }

    /// Stops the refresh loop and waits for it to finish.
    ///
    /// When this returns `true`, the sink's `stop` callback has already run
    /// and no further updates will be delivered. Repeated calls and calls on
    /// a service that never started are silent no-ops returning `false`;
    /// stopping an idle service still pins it so a later [`start`] is
    /// rejected.
    ///
    /// [`start`]: TripStatusService::start
    pub async fn stop(&self) -> bool {
        match self.state.compare_exchange(
            STATE_RUNNING,
            STATE_STOPPED,
            Ordering::SeqCst,
            Ordering::SeqCst,
        ) {
            Ok(_) => {
                self.token.cancel();
                let handle = self.ticker.lock().await.take();
                if let Some(handle) = handle {
                    if let Err(e) = handle.await {
                        tracing::warn!(error = %e, "refresh loop task ended abnormally");
                    }
                }
                true
            }
            Err(_) => {
                // Stopping before the first start is legal and pins the
                // state, so the lifecycle stays one way.
                let _ = self.state.compare_exchange(
                    STATE_IDLE,
                    STATE_STOPPED,
                    Ordering::SeqCst,
                    Ordering::SeqCst,
                );
                tracing::debug!("stop ignored: refresh loop not running");
                false
            }
        }
    }

    /// Returns true while the refresh loop is active.
    pub fn is_running(&self) -> bool {
        self.state.load(Ordering::SeqCst) == STATE_RUNNING
    }

    /// Replaces the route progress reported in subsequent updates.
    ///
    /// Pass `None` when the destination is cleared and the trip falls back
    /// to free-drive. Takes effect from the next tick; in-flight updates are
    /// not rewritten.
    pub fn set_progress(&self, progress: Option<RouteProgress>) {
        *write_progress(&self.progress) = progress;
    }

    /// Returns the route progress the next update will carry.
    pub fn progress(&self) -> Option<RouteProgress> {
        read_progress(&self.progress).clone()
    }
}

impl Drop for TripStatusService {
    fn drop(&mut self) {
        // The loop task owns clones of the sink and token, so the final
        // sink.stop() still runs after the service itself is gone.
        self.token.cancel();
    }
}

/// Spawns the background task that pushes one status per tick until the
/// token is cancelled, then calls the sink's `stop` exactly once.
fn spawn_refresh_loop(
    sink: Arc<dyn TripNotificationSink>,
    period: Duration,
    token: CancellationToken,
    progress: Arc<RwLock<Option<RouteProgress>>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let started_at = Instant::now();
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = interval.tick() => {
                    // A cancel can land between the tick firing and this
                    // branch running. No update may follow it.
                    if token.is_cancelled() {
                        break;
                    }
                    let status = TripStatus {
                        elapsed: started_at.elapsed(),
                        progress: read_progress(&progress).clone(),
                    };
                    if let Err(e) = sink.update(&status).await {
                        tracing::warn!(
                            sink = sink.name(),
                            error = %e,
                            "status update rejected by sink, loop continues"
                        );
                    }
                }
            }
        }

        if let Err(e) = sink.stop().await {
            tracing::warn!(sink = sink.name(), error = %e, "sink stop callback failed");
        }
        tracing::info!(sink = sink.name(), "trip status refresh stopped");
    })
}

// A poisoned lock only means another thread panicked mid-update; the
// progress value itself is still usable.
fn read_progress(
    lock: &RwLock<Option<RouteProgress>>,
) -> RwLockReadGuard<'_, Option<RouteProgress>> {
    match lock.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn write_progress(
    lock: &RwLock<Option<RouteProgress>>,
) -> RwLockWriteGuard<'_, Option<RouteProgress>> {
    match lock.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
