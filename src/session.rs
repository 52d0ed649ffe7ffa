//! One signed-in-or-not session: both containers with an explicit lifetime.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use crate::{
    auth::AuthContext,
    config::Config,
    error::TripError,
    location::{LocationSource, LocationTracker},
    store::{Store, StoreAdapter},
    trips::TripContext,
};

pub struct Session {
    config: Config,
    auth: Arc<AuthContext>,
    trips: Arc<Mutex<TripContext>>,
    tracker: Option<LocationTracker>,
}

impl Session {
    pub fn open(config: Config, store: Arc<dyn Store>) -> Result<Self, TripError> {
        let storage = StoreAdapter::new(store);
        let auth = Arc::new(AuthContext::new(storage.clone(), config.simulated_latency));
        let trips = TripContext::new(storage, auth.clone())?;
        Ok(Self {
            config,
            auth,
            trips: Arc::new(Mutex::new(trips)),
            tracker: None,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn auth(&self) -> &Arc<AuthContext> {
        &self.auth
    }

    pub fn trips(&self) -> &Arc<Mutex<TripContext>> {
        &self.trips
    }

    /// Starts sharing positions from `source` on the configured interval,
    /// replacing any tracker already running.
    pub async fn start_location_sharing<S: LocationSource>(&mut self, source: S) {
        self.stop_location_sharing().await;
        self.tracker = Some(LocationTracker::start(
            self.trips.clone(),
            source,
            self.config.location_interval,
        ));
    }

    pub async fn stop_location_sharing(&mut self) {
        if let Some(tracker) = self.tracker.take() {
            tracker.stop().await;
        }
    }

    pub fn is_sharing_location(&self) -> bool {
        self.tracker.as_ref().is_some_and(LocationTracker::is_running)
    }

    pub async fn close(mut self) {
        self.stop_location_sharing().await;
        self.auth.close();
        info!("Session closed");
    }
}
