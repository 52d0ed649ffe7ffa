//! Checks the presentation layer runs on raw form input before calling the
//! containers. A failed check means "show the message, change nothing".

use chrono::{DateTime, NaiveDate, Utc};

use crate::{
    catalog::random_cover_image,
    error::ValidationError,
    schemas::{NewExpense, NewPhoto, NewTrip, Trip, User},
};

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| ValidationError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

#[derive(Clone, Debug, Default)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

impl SignInForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if non_empty(&self.email).is_none() || self.password.is_empty() {
            return Err(ValidationError::MissingCredentials);
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default)]
pub struct SignUpForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl SignUpForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if non_empty(&self.name).is_none() {
            return Err(ValidationError::MissingName);
        }
        if non_empty(&self.email).is_none() || self.password.is_empty() {
            return Err(ValidationError::MissingCredentials);
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default)]
pub struct TripForm {
    pub name: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
}

impl TripForm {
    /// `today` is the earliest allowed start date.
    pub fn validate(&self, today: NaiveDate) -> Result<NewTrip, ValidationError> {
        let (Some(name), Some(location), Some(start), Some(end)) = (
            non_empty(&self.name),
            non_empty(&self.location),
            non_empty(&self.start_date),
            non_empty(&self.end_date),
        ) else {
            return Err(ValidationError::MissingFields);
        };

        let start_date = parse_date("start", &start)?;
        let end_date = parse_date("end", &end)?;
        if start_date < today {
            return Err(ValidationError::StartInPast);
        }
        if end_date < start_date {
            return Err(ValidationError::EndBeforeStart);
        }

        Ok(NewTrip {
            name,
            location,
            start_date,
            end_date,
            cover_image: random_cover_image().to_string(),
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct ExpenseForm {
    pub name: String,
    pub description: String,
    pub amount: String,
    pub date: String,
    /// Member ids ticked in the split picker.
    pub selected_members: Vec<String>,
}

impl ExpenseForm {
    pub fn validate(&self, trip: &Trip, payer: &User) -> Result<NewExpense, ValidationError> {
        let (Some(name), Some(amount)) = (non_empty(&self.name), non_empty(&self.amount)) else {
            return Err(ValidationError::MissingExpenseFields);
        };
        let amount = match amount.parse::<f64>() {
            Ok(value) if value.is_finite() && value >= 0.0 => value,
            _ => return Err(ValidationError::InvalidAmount(amount)),
        };
        let date = parse_date("expense", &self.date)?;

        let split_with = trip
            .members
            .iter()
            .filter(|member| self.selected_members.contains(&member.id))
            .cloned()
            .collect::<Vec<_>>();
        let split_with = if split_with.is_empty() {
            trip.members.clone()
        } else {
            split_with
        };

        Ok(NewExpense {
            name,
            description: non_empty(&self.description),
            amount,
            date,
            paid_by: payer.as_person(),
            split_with,
        })
    }
}

/// Returns the trimmed code when it names one of `trips`.
pub fn validate_join_code(code: &str, trips: &[Trip]) -> Result<String, ValidationError> {
    let code = non_empty(code).ok_or(ValidationError::MissingJoinCode)?;
    if !trips.iter().any(|trip| trip.id == code) {
        return Err(ValidationError::UnknownJoinCode);
    }
    Ok(code)
}

#[derive(Clone, Debug, Default)]
pub struct PhotoForm {
    /// Data or object URL of the picked file.
    pub url: Option<String>,
    pub caption: String,
    pub location: String,
}

impl PhotoForm {
    pub fn validate(
        &self,
        uploader: &User,
        now: DateTime<Utc>,
    ) -> Result<NewPhoto, ValidationError> {
        let url = self
            .url
            .as_deref()
            .and_then(non_empty)
            .ok_or(ValidationError::MissingPhoto)?;
        Ok(NewPhoto {
            url,
            caption: non_empty(&self.caption),
            location: non_empty(&self.location),
            uploaded_by: uploader.as_person(),
            date: now,
        })
    }
}
