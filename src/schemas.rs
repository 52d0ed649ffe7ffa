use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = String;
pub type TripId = String;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl User {
    /// Snapshot of this user as a trip member. Later profile edits are not
    /// reflected in snapshots taken earlier.
    pub fn as_person(&self) -> Person {
        Person {
            id: self.id.clone(),
            name: self.name.clone(),
            avatar: self.avatar.clone(),
            location: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Person {
    pub id: UserId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl Person {
    pub fn is_sharing_location(&self) -> bool {
        self.location.is_some()
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub amount: f64,
    pub date: NaiveDate,
    pub paid_by: Person,
    pub split_with: Vec<Person>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub uploaded_by: Person,
    pub date: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Hotel {
    pub id: String,
    pub name: String,
    pub image: String,
    pub rating: f32,
    pub price: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: TripId,
    pub name: String,
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub cover_image: String,
    pub created_by: UserId,
    pub members: Vec<Person>,
    pub expenses: Vec<Expense>,
    pub photos: Vec<Photo>,
    pub hotels: Vec<Hotel>,
}

impl Trip {
    pub fn is_member(&self, user_id: &str) -> bool {
        self.members.iter().any(|member| member.id == user_id)
    }

    pub fn total_expenses(&self) -> f64 {
        self.expenses.iter().map(|expense| expense.amount).sum()
    }

    /// The trip id doubles as its join code.
    pub fn invite_message(&self) -> String {
        format!("Join my trip on TripMates! Trip Code: {}", self.id)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewTrip {
    pub name: String,
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub cover_image: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewExpense {
    pub name: String,
    pub description: Option<String>,
    pub amount: f64,
    pub date: NaiveDate,
    pub paid_by: Person,
    /// Empty means "everyone currently on the trip".
    pub split_with: Vec<Person>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewPhoto {
    pub url: String,
    pub caption: Option<String>,
    pub location: Option<String>,
    pub uploaded_by: Person,
    pub date: DateTime<Utc>,
}

/// Long-form date used across the trip pages, e.g. "June 15, 2025".
pub fn format_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}
