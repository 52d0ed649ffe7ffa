//! The trip collection and the currently selected trip.
//!
//! Every mutation builds the next collection, persists it under
//! [`TRIPS_KEY`] and only then swaps it in, so memory never runs ahead of
//! storage. The current trip is held by id and resolved against the
//! collection, which keeps "the selected trip" and "that trip in the list"
//! identical.
//!
//! Operations whose preconditions are not met (nobody signed in, no current
//! trip, unknown trip id) are skipped and return `Ok(None)`.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    auth::AuthContext,
    catalog::{demo_trips, nearby_hotels},
    error::TripError,
    schemas::{Expense, Location, NewExpense, NewPhoto, NewTrip, Photo, Trip, TripId, User},
    store::{StoreAdapter, TRIPS_KEY},
};

fn fresh_id(taken: impl Fn(&str) -> bool) -> Result<String, TripError> {
    let id = Uuid::new_v4().to_string();
    if taken(&id) {
        return Err(TripError::IdCollision(id));
    }
    Ok(id)
}

pub struct TripContext {
    storage: StoreAdapter,
    auth: Arc<AuthContext>,
    trips: Vec<Trip>,
    current: Option<TripId>,
}

impl TripContext {
    /// Loads the stored collection. When nothing usable is stored and a user
    /// is already signed in, the demo trip is seeded and persisted.
    pub fn new(storage: StoreAdapter, auth: Arc<AuthContext>) -> Result<Self, TripError> {
        let trips = match storage.read_or_discard::<Vec<Trip>>(TRIPS_KEY) {
            Some(trips) => {
                debug!("Loaded {} trips", trips.len());
                trips
            }
            None => match auth.user() {
                Some(user) => {
                    let demo = demo_trips(&user);
                    storage.write(TRIPS_KEY, &demo)?;
                    info!("Seeded demo trips for {}", user.email);
                    demo
                }
                None => Vec::new(),
            },
        };
        Ok(Self {
            storage,
            auth,
            trips,
            current: None,
        })
    }

    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    pub fn find_trip(&self, id: &str) -> Option<&Trip> {
        self.trips.iter().find(|trip| trip.id == id)
    }

    pub fn current_trip(&self) -> Option<&Trip> {
        self.current.as_deref().and_then(|id| self.find_trip(id))
    }

    /// Changes the selection without touching storage. Returns false, leaving
    /// the selection unchanged, when `id` names no trip.
    pub fn select_trip(&mut self, id: Option<&str>) -> bool {
        match id {
            None => {
                self.current = None;
                true
            }
            Some(id) if self.find_trip(id).is_some() => {
                self.current = Some(id.to_string());
                true
            }
            Some(_) => false,
        }
    }

    fn replaced(&self, updated: &Trip) -> Vec<Trip> {
        self.trips
            .iter()
            .map(|trip| {
                if trip.id == updated.id {
                    updated.clone()
                } else {
                    trip.clone()
                }
            })
            .collect()
    }

    fn commit(&mut self, trips: Vec<Trip>, current: TripId) -> Result<(), TripError> {
        self.storage.write(TRIPS_KEY, &trips)?;
        self.trips = trips;
        self.current = Some(current);
        Ok(())
    }

    /// Replaces the current trip with `update(current, user)`. `update`
    /// returning `None` skips the change.
    fn update_current(
        &mut self,
        op: &str,
        update: impl FnOnce(&Trip, &User) -> Result<Option<Trip>, TripError>,
    ) -> Result<Option<Trip>, TripError> {
        let (Some(trip), Some(user)) = (self.current_trip(), self.auth.user()) else {
            debug!("Skipping {op}: no current trip or no signed-in user");
            return Ok(None);
        };
        let Some(updated) = update(trip, &user)? else {
            return Ok(None);
        };
        let trips = self.replaced(&updated);
        self.commit(trips, updated.id.clone())?;
        Ok(Some(updated))
    }

    pub fn create_trip(&mut self, data: NewTrip) -> Result<Option<Trip>, TripError> {
        let Some(user) = self.auth.user() else {
            debug!("Skipping create_trip: nobody signed in");
            return Ok(None);
        };
        let id = fresh_id(|id| self.find_trip(id).is_some())?;
        let trip = Trip {
            id,
            name: data.name,
            location: data.location,
            start_date: data.start_date,
            end_date: data.end_date,
            cover_image: data.cover_image,
            created_by: user.id.clone(),
            members: vec![user.as_person()],
            expenses: vec![],
            photos: vec![],
            hotels: vec![],
        };

        let mut trips = self.trips.clone();
        trips.push(trip.clone());
        self.commit(trips, trip.id.clone())?;
        info!("{} created trip {} ({})", user.email, trip.name, trip.id);
        Ok(Some(trip))
    }

    /// Adds the signed-in user to the trip whose id is `trip_id` and selects
    /// it. Joining twice does not duplicate the membership.
    pub fn join_trip(&mut self, trip_id: &str) -> Result<Option<Trip>, TripError> {
        let Some(user) = self.auth.user() else {
            debug!("Skipping join_trip: nobody signed in");
            return Ok(None);
        };
        let Some(index) = self.trips.iter().position(|trip| trip.id == trip_id) else {
            debug!("Skipping join_trip: unknown trip {trip_id}");
            return Ok(None);
        };

        let mut trip = self.trips[index].clone();
        if !trip.is_member(&user.id) {
            trip.members.push(user.as_person());
            info!("{} joined trip {}", user.email, trip.id);
        }
        let mut trips = self.trips.clone();
        trips[index] = trip.clone();
        self.commit(trips, trip.id.clone())?;
        Ok(Some(trip))
    }

    /// Appends an expense to the current trip. An empty `split_with` is
    /// replaced by the trip's members as they are now.
    pub fn add_expense(&mut self, data: NewExpense) -> Result<Option<Trip>, TripError> {
        self.update_current("add_expense", |trip, _| {
            let id = fresh_id(|id| trip.expenses.iter().any(|e| e.id == id))?;
            let split_with = if data.split_with.is_empty() {
                trip.members.clone()
            } else {
                data.split_with
            };
            let mut trip = trip.clone();
            trip.expenses.push(Expense {
                id,
                name: data.name,
                description: data.description,
                amount: data.amount,
                date: data.date,
                paid_by: data.paid_by,
                split_with,
            });
            Ok(Some(trip))
        })
    }

    pub fn add_photo(&mut self, data: NewPhoto) -> Result<Option<Trip>, TripError> {
        self.update_current("add_photo", |trip, _| {
            let id = fresh_id(|id| trip.photos.iter().any(|p| p.id == id))?;
            let mut trip = trip.clone();
            trip.photos.push(Photo {
                id,
                url: data.url,
                caption: data.caption,
                location: data.location,
                uploaded_by: data.uploaded_by,
                date: data.date,
            });
            Ok(Some(trip))
        })
    }

    /// Records the signed-in user's position on the current trip. Skipped when
    /// the user is not a member of it.
    pub fn update_location(&mut self, location: Location) -> Result<Option<Trip>, TripError> {
        self.update_current("update_location", |trip, user| {
            if !trip.is_member(&user.id) {
                debug!("Skipping update_location: {} is not on {}", user.email, trip.id);
                return Ok(None);
            }
            let mut trip = trip.clone();
            for member in trip.members.iter_mut().filter(|m| m.id == user.id) {
                member.location = Some(location);
            }
            Ok(Some(trip))
        })
    }

    /// Replaces the current trip's hotels with the fixed suggestion catalog.
    pub fn load_nearby_hotels(&mut self) -> Result<Option<Trip>, TripError> {
        let Some(trip) = self.current_trip() else {
            debug!("Skipping load_nearby_hotels: no current trip");
            return Ok(None);
        };
        let mut updated = trip.clone();
        updated.hotels = nearby_hotels();
        let trips = self.replaced(&updated);
        self.commit(trips, updated.id.clone())?;
        Ok(Some(updated))
    }

    /// Loads hotel suggestions only if the current trip has none yet.
    pub fn ensure_hotels(&mut self) -> Result<Option<Trip>, TripError> {
        let Some(trip) = self.current_trip() else {
            return Ok(None);
        };
        if trip.hotels.is_empty() {
            return self.load_nearby_hotels();
        }
        Ok(Some(trip.clone()))
    }
}
