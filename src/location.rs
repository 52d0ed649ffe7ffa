//! Periodic sharing of the signed-in user's position on the current trip.

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use futures::future::{AbortHandle, Abortable};
use thiserror::Error;
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::{debug, warn};

use crate::{schemas::Location, trips::TripContext};

/// Shortest refresh period the tracker will run with.
pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("Unable to access your location. Please check your permissions.")]
    PermissionDenied,

    #[error("Geolocation is not supported on this device.")]
    Unsupported,

    #[error("Position unavailable: {0}")]
    Unavailable(String),
}

pub trait LocationSource: Send + Sync + 'static {
    fn current_position(&self) -> Result<Coordinates, LocationError>;
}

/// Shares a position right away and then once per `interval` until stopped
/// or dropped. Intervals below [`MIN_INTERVAL`] are raised to it.
pub struct LocationTracker {
    abort: AbortHandle,
    task: Option<JoinHandle<()>>,
}

impl LocationTracker {
    pub fn start<S: LocationSource>(
        trips: Arc<Mutex<TripContext>>,
        source: S,
        interval: Duration,
    ) -> Self {
        let interval = interval.max(MIN_INTERVAL);
        let (abort, registration) = AbortHandle::new_pair();
        let refresh = async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                share_position(&trips, &source).await;
            }
        };
        let task = tokio::spawn(async move {
            let _ = Abortable::new(refresh, registration).await;
            debug!("Location tracking stopped");
        });
        Self {
            abort,
            task: Some(task),
        }
    }

    pub fn is_running(&self) -> bool {
        !self.abort.is_aborted() && self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stops the refresh loop and waits for it to wind down.
    pub async fn stop(mut self) {
        self.abort.abort();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for LocationTracker {
    fn drop(&mut self) {
        self.abort.abort();
    }
}

async fn share_position<S: LocationSource>(trips: &Mutex<TripContext>, source: &S) {
    let coords = match source.current_position() {
        Ok(coords) => coords,
        Err(err) => {
            warn!("Skipping location refresh: {err}");
            return;
        }
    };
    let location = Location {
        latitude: coords.latitude,
        longitude: coords.longitude,
        timestamp: Utc::now().timestamp_millis(),
    };
    match trips.lock().await.update_location(location) {
        Ok(Some(_)) => debug!("Shared location {:.5}, {:.5}", coords.latitude, coords.longitude),
        Ok(None) => {}
        Err(err) => warn!("Failed to save location: {err}"),
    }
}
