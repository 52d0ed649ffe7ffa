use std::{sync::Arc, time::Duration};

use chrono::NaiveDate;
use tripmates::{
    schemas::{NewExpense, NewTrip, Person},
    AuthContext, Config, MemoryStore, Session, StoreAdapter, TripContext,
};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Config with no simulated latency and a one minute location interval.
pub fn test_config() -> Config {
    Config {
        data_dir: std::env::temp_dir().join("tripmates-tests"),
        simulated_latency: Duration::ZERO,
        location_interval: Duration::from_secs(60),
    }
}

pub fn beach_getaway() -> NewTrip {
    NewTrip {
        name: "Beach Getaway".to_string(),
        location: "Malibu, CA".to_string(),
        start_date: date(2025, 6, 15),
        end_date: date(2025, 6, 22),
        cover_image: "https://example.com/beach.jpg".to_string(),
    }
}

pub fn expense(amount: f64, paid_by: Person, split_with: Vec<Person>) -> NewExpense {
    NewExpense {
        name: "Hotel Reservation".to_string(),
        description: None,
        amount,
        date: date(2025, 5, 20),
        paid_by,
        split_with,
    }
}

/// A signed-in auth container and a trip container sharing one store.
pub async fn signed_in(store: &Arc<MemoryStore>, email: &str) -> (Arc<AuthContext>, TripContext) {
    let auth = Arc::new(AuthContext::new(
        StoreAdapter::new(store.clone()),
        Duration::ZERO,
    ));
    auth.sign_in(email, "secret").await.expect("sign in");
    let trips = TripContext::new(StoreAdapter::new(store.clone()), auth.clone())
        .expect("open trips");
    (auth, trips)
}

pub fn open_session(store: &Arc<MemoryStore>) -> Session {
    Session::open(test_config(), store.clone()).expect("open session")
}
