//! Trip notification sink trait and the status payload pushed through it.
//!
//! The refresh loop in [`crate::trip_service`] computes a [`TripStatus`] once
//! per tick and hands it to a [`TripNotificationSink`]. The sink is the
//! integration seam: hosts implement it over whatever foreground-notification
//! surface the platform offers, and tests implement it with an in-memory
//! recorder.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::duration_millis_serde;
use crate::error::Result;

/// Route progress snapshot for an active turn-by-turn session.
///
/// Absent from [`TripStatus`] while free-driving (tracking position with no
/// destination set).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteProgress {
    /// Meters left to the destination.
    pub distance_remaining_meters: f64,
    /// Travel time left to the destination.
    #[serde(with = "duration_millis_serde")]
    pub duration_remaining: Duration,
    /// Estimated time of arrival, when the router provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eta: Option<DateTime<Utc>>,
}

/// One notification refresh payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripStatus {
    /// Time elapsed since the trip session started.
    #[serde(with = "duration_millis_serde")]
    pub elapsed: Duration,
    /// Progress along the active route. `None` while free-driving.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<RouteProgress>,
}

impl TripStatus {
    /// Creates a free-drive status with no route progress.
    pub fn free_drive(elapsed: Duration) -> Self {
        Self {
            elapsed,
            progress: None,
        }
    }

    /// Returns true when no route is active.
    pub fn is_free_drive(&self) -> bool {
        self.progress.is_none()
    }
}

/// Receiver for periodic trip status updates.
///
/// All three callbacks are invoked from the refresh loop's background task,
/// never from the caller's stack. Implementations should return quickly; a
/// slow `update` delays the next tick but is otherwise harmless because
/// missed ticks are skipped rather than replayed.
#[async_trait]
pub trait TripNotificationSink: Send + Sync {
    /// Called once when the refresh loop starts, before the first update.
    async fn start_foreground(&self) -> Result<()>;

    /// Called once per tick with the freshly computed status.
    async fn update(&self, status: &TripStatus) -> Result<()>;

    /// Called exactly once when the refresh loop exits.
    async fn stop(&self) -> Result<()>;

    /// Short sink name used in log messages.
    fn name(&self) -> &'static str;
}
