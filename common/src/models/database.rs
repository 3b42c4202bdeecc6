//! Database administration models.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for creating a database.
///
/// `name` is optional on the wire so a missing field reaches the service and
/// is rejected as an empty name instead of a deserialization failure.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateDatabaseRequest {
    /// Name of the database to create.
    #[serde(default)]
    pub name: Option<String>,
}

impl CreateDatabaseRequest {
    /// The requested name, with a missing field read as empty.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

/// One row of a database statistics report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatEntry {
    /// Statistic name as reported by the server.
    #[serde(rename = "Key")]
    pub key: String,
    /// Stringified value.
    #[serde(rename = "Value")]
    pub value: String,
    /// Short type name of the value (e.g. "Double", "Integer").
    #[serde(rename = "Type")]
    pub type_name: String,
}

impl StatEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            type_name: type_name.into(),
        }
    }
}
