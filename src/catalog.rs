use chrono::NaiveDate;
use uuid::Uuid;

use crate::schemas::{Expense, Hotel, Person, Trip, User};

pub fn avatar_url(seed: &str) -> String {
    format!("https://api.dicebear.com/7.x/avataaars/svg?seed={seed}")
}

pub const COVER_IMAGES: [&str; 6] = [
    "https://images.unsplash.com/photo-1507525428034-b723cf961d3e?ixlib=rb-4.0.3&q=85&fm=jpg&crop=entropy&cs=srgb&w=1200",
    "https://images.unsplash.com/photo-1476514525535-07fb3b4ae5f1?ixlib=rb-4.0.3&q=85&fm=jpg&crop=entropy&cs=srgb&w=1200",
    "https://images.unsplash.com/photo-1465778893808-b7135981586d?ixlib=rb-4.0.3&q=85&fm=jpg&crop=entropy&cs=srgb&w=1200",
    "https://images.unsplash.com/photo-1488085061387-422e29b40080?ixlib=rb-4.0.3&q=85&fm=jpg&crop=entropy&cs=srgb&w=1200",
    "https://images.unsplash.com/photo-1526772662000-3f88f10405ff?ixlib=rb-4.0.3&q=85&fm=jpg&crop=entropy&cs=srgb&w=1200",
    "https://images.unsplash.com/photo-1530789253388-582c481c54b0?ixlib=rb-4.0.3&q=85&fm=jpg&crop=entropy&cs=srgb&w=1200",
];

pub fn random_cover_image() -> &'static str {
    // v4 uuids are random, so their bits double as the pick
    let index = (Uuid::new_v4().as_u128() % COVER_IMAGES.len() as u128) as usize;
    COVER_IMAGES[index]
}

fn hotel(id: &str, name: &str, image: &str, rating: f32, price: &str) -> Hotel {
    Hotel {
        id: id.to_string(),
        name: name.to_string(),
        image: image.to_string(),
        rating,
        price: price.to_string(),
    }
}

/// Fixed suggestions. Not derived from the trip location.
pub fn nearby_hotels() -> Vec<Hotel> {
    vec![
        hotel(
            "1",
            "Ocean View Resort",
            "https://images.unsplash.com/photo-1566073771259-6a8506099945?ixlib=rb-4.0.3&auto=format&fit=crop&w=800&q=80",
            4.8,
            "$250/night",
        ),
        hotel(
            "2",
            "City Center Hotel",
            "https://images.unsplash.com/photo-1551882547-ff40c63fe5fa?ixlib=rb-4.0.3&auto=format&fit=crop&w=800&q=80",
            4.5,
            "$180/night",
        ),
        hotel(
            "3",
            "Mountain Lodge",
            "https://images.unsplash.com/photo-1520250497591-112f2f40a3f4?ixlib=rb-4.0.3&auto=format&fit=crop&w=800&q=80",
            4.2,
            "$150/night",
        ),
        hotel(
            "4",
            "Lakeside Inn",
            "https://images.unsplash.com/photo-1542314831-068cd1dbfeeb?ixlib=rb-4.0.3&auto=format&fit=crop&w=800&q=80",
            4.7,
            "$220/night",
        ),
    ]
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

/// The trip shown to a signed-in user on first launch.
pub fn demo_trips(user: &User) -> Vec<Trip> {
    let me = user.as_person();
    let alex = Person {
        id: "2".to_string(),
        name: "Alex Johnson".to_string(),
        avatar: Some(avatar_url("Alex")),
        location: None,
    };

    vec![Trip {
        id: "1".to_string(),
        name: "Beach Getaway".to_string(),
        location: "Malibu, CA".to_string(),
        start_date: date(2025, 6, 15),
        end_date: date(2025, 6, 22),
        cover_image: COVER_IMAGES[0].to_string(),
        created_by: user.id.clone(),
        members: vec![me.clone(), alex.clone()],
        expenses: vec![Expense {
            id: "1".to_string(),
            name: "Hotel Reservation".to_string(),
            description: Some("Beach resort for 3 nights".to_string()),
            amount: 450.0,
            date: date(2025, 5, 20),
            paid_by: me.clone(),
            split_with: vec![me, alex],
        }],
        photos: vec![],
        hotels: vec![],
    }]
}
