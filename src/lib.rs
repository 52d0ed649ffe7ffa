pub mod auth;
pub mod balance;
pub mod catalog;
pub mod config;
pub mod error;
pub mod forms;
pub mod location;
pub mod schemas;
pub mod session;
pub mod store;
pub mod trips;

pub use auth::{AuthContext, AuthState};
pub use config::Config;
pub use error::{AuthError, ConfigError, StoreError, TripError, ValidationError};
pub use session::Session;
pub use store::{FileStore, MemoryStore, Store, StoreAdapter};
pub use trips::TripContext;
