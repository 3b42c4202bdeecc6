//! Storage collaborator contracts.
//!
//! The administration service only talks to the server through these traits.
//! [`crate::mongo`] implements them over the MongoDB driver and
//! [`crate::session_registry`] binds session keys to connections.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use common::errors::AppResult;

/// Low-level failure reported by a storage connection.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),

    #[error("{0}")]
    Transport(String),
}

/// Dynamically typed value of a statistics document.
#[derive(Debug, Clone, PartialEq)]
pub enum StatValue {
    Null,
    Boolean(bool),
    Int32(i32),
    Int64(i64),
    Double(f64),
    String(String),
    /// Milliseconds since the Unix epoch.
    DateTime(i64),
    Timestamp { time: u32, increment: u32 },
    /// Hex form of the object id.
    ObjectId(String),
    Document(Vec<(String, StatValue)>),
    Array(Vec<StatValue>),
    /// Any other server type, already rendered as text.
    Other(String),
}

/// Statistics document in server iteration order.
pub type StatsDocument = Vec<(String, StatValue)>;

/// Connection to one storage server.
#[async_trait]
pub trait StorageConnection: Send + Sync {
    /// Names of all databases currently on the server.
    async fn list_database_names(&self) -> Result<Vec<String>, StorageError>;

    /// Handle for the named database. Does not contact the server.
    fn database(&self, name: &str) -> Box<dyn DatabaseHandle>;

    async fn drop_database(&self, name: &str) -> Result<(), StorageError>;
}

/// Handle on a single database.
#[async_trait]
pub trait DatabaseHandle: Send + Sync {
    fn name(&self) -> &str;

    /// Touches the database so the server persists it.
    ///
    /// The MongoDB implementation only lists collections. Current servers do
    /// not persist a database with no collections, so a freshly created name
    /// may not show up in `list_database_names` until something is written.
    async fn force_materialize(&self) -> Result<(), StorageError>;

    async fn stats(&self) -> Result<StatsDocument, StorageError>;
}

/// Resolves a session key to its live connection.
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    /// Fails with `AppError::ConnectionUnavailable` when the key is unknown.
    async fn resolve(&self, session_key: &str) -> AppResult<Arc<dyn StorageConnection>>;
}
