use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Value for {key} is {len} bytes, over the {limit} byte quota")]
    QuotaExceeded { key: String, len: usize, limit: usize },
}

#[derive(Error, Debug)]
pub enum WriteError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Encode(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Session closed before the request finished")]
    Closed,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Failed to encode user: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<WriteError> for AuthError {
    fn from(err: WriteError) -> Self {
        match err {
            WriteError::Store(err) => AuthError::Store(err),
            WriteError::Encode(err) => AuthError::Encode(err),
        }
    }
}

#[derive(Error, Debug)]
pub enum TripError {
    #[error("Generated id {0} is already taken")]
    IdCollision(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Failed to encode trips: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<WriteError> for TripError {
    fn from(err: WriteError) -> Self {
        match err {
            WriteError::Store(err) => TripError::Store(err),
            WriteError::Encode(err) => TripError::Encode(err),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please fill in all fields.")]
    MissingFields,

    #[error("Invalid {field} date: {value}")]
    InvalidDate { field: &'static str, value: String },

    #[error("Start date cannot be in the past.")]
    StartInPast,

    #[error("End date must be after start date.")]
    EndBeforeStart,

    #[error("Please provide a name and amount for the expense.")]
    MissingExpenseFields,

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Please enter a trip code.")]
    MissingJoinCode,

    #[error("Invalid trip code. Please check and try again.")]
    UnknownJoinCode,

    #[error("Please select a file to upload.")]
    MissingPhoto,

    #[error("Please enter your email and password.")]
    MissingCredentials,

    #[error("Please enter your name.")]
    MissingName,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}
