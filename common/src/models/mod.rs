//! Shared data models for all services.

pub mod database;
pub mod session;

// Re-export commonly used types
pub use database::{CreateDatabaseRequest, StatEntry};
pub use session::{LoginRequest, SessionItem, DEFAULT_MONGO_PORT};
