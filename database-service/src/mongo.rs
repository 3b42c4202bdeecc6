//! MongoDB implementation of the storage contracts.

use async_trait::async_trait;
use mongodb::bson::{doc, Bson, Document};
use mongodb::{Client, Database};

use crate::storage::{DatabaseHandle, StatValue, StatsDocument, StorageConnection, StorageError};

/// Storage connection backed by a MongoDB client.
#[derive(Clone)]
pub struct MongoStorage {
    client: Client,
}

impl MongoStorage {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Round-trips a `ping` to the `admin` database.
    pub async fn ping(&self) -> Result<(), StorageError> {
        let reply = self
            .client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;

        if command_ok(&reply) {
            Ok(())
        } else {
            Err(StorageError::Transport(format!("unexpected ping reply: {}", reply)))
        }
    }

    /// Closes the client's sockets and background monitors.
    pub async fn shutdown(&self) {
        self.client.clone().shutdown().await;
    }
}

#[async_trait]
impl StorageConnection for MongoStorage {
    async fn list_database_names(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.client.list_database_names().await?)
    }

    fn database(&self, name: &str) -> Box<dyn DatabaseHandle> {
        Box::new(MongoDatabase {
            db: self.client.database(name),
        })
    }

    async fn drop_database(&self, name: &str) -> Result<(), StorageError> {
        self.client.database(name).drop().await?;
        Ok(())
    }
}

struct MongoDatabase {
    db: Database,
}

#[async_trait]
impl DatabaseHandle for MongoDatabase {
    fn name(&self) -> &str {
        self.db.name()
    }

    async fn force_materialize(&self) -> Result<(), StorageError> {
        // MongoDB creates databases lazily; touching the collection list is the trigger.
        self.db.list_collection_names().await?;
        Ok(())
    }

    async fn stats(&self) -> Result<StatsDocument, StorageError> {
        let reply = self.db.run_command(doc! { "dbStats": 1 }).await?;
        Ok(stats_from_document(reply))
    }
}

fn command_ok(reply: &Document) -> bool {
    match reply.get("ok") {
        Some(Bson::Double(v)) => *v == 1.0,
        Some(Bson::Int32(v)) => *v == 1,
        Some(Bson::Int64(v)) => *v == 1,
        _ => false,
    }
}

/// Flattens a command reply into ordered stat pairs.
pub fn stats_from_document(doc: Document) -> StatsDocument {
    doc.into_iter()
        .map(|(key, value)| (key, StatValue::from(value)))
        .collect()
}

impl From<Bson> for StatValue {
    fn from(value: Bson) -> Self {
        match value {
            Bson::Null => StatValue::Null,
            Bson::Boolean(v) => StatValue::Boolean(v),
            Bson::Int32(v) => StatValue::Int32(v),
            Bson::Int64(v) => StatValue::Int64(v),
            Bson::Double(v) => StatValue::Double(v),
            Bson::String(v) => StatValue::String(v),
            Bson::DateTime(v) => StatValue::DateTime(v.timestamp_millis()),
            Bson::Timestamp(ts) => StatValue::Timestamp {
                time: ts.time,
                increment: ts.increment,
            },
            Bson::ObjectId(oid) => StatValue::ObjectId(oid.to_hex()),
            Bson::Document(doc) => StatValue::Document(stats_from_document(doc)),
            Bson::Array(items) => StatValue::Array(items.into_iter().map(StatValue::from).collect()),
            other => StatValue::Other(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;
    use mongodb::bson::Timestamp;

    #[test]
    fn test_stats_keep_document_order() {
        let stats = stats_from_document(doc! {
            "db": "shop",
            "collections": 3_i32,
            "dataSize": 1024.0,
            "ok": 1.0,
        });
        let keys: Vec<_> = stats.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["db", "collections", "dataSize", "ok"]);
        assert_eq!(stats[1].1, StatValue::Int32(3));
        assert_eq!(stats[3].1, StatValue::Double(1.0));
    }

    #[test]
    fn test_scalar_conversions() {
        assert_eq!(StatValue::from(Bson::Int64(7)), StatValue::Int64(7));
        assert_eq!(StatValue::from(Bson::Boolean(true)), StatValue::Boolean(true));
        assert_eq!(StatValue::from(Bson::Null), StatValue::Null);
        assert_eq!(
            StatValue::from(Bson::Timestamp(Timestamp { time: 5, increment: 2 })),
            StatValue::Timestamp { time: 5, increment: 2 }
        );

        let oid = ObjectId::new();
        assert_eq!(StatValue::from(Bson::ObjectId(oid)), StatValue::ObjectId(oid.to_hex()));
    }

    #[test]
    fn test_nested_values_convert_recursively() {
        let value = StatValue::from(Bson::Document(doc! { "a": [1_i32, "x"] }));
        assert_eq!(
            value,
            StatValue::Document(vec![(
                "a".to_string(),
                StatValue::Array(vec![StatValue::Int32(1), StatValue::String("x".into())])
            )])
        );
    }

    #[test]
    fn test_command_ok_accepts_numeric_forms() {
        assert!(command_ok(&doc! { "ok": 1.0 }));
        assert!(command_ok(&doc! { "ok": 1_i32 }));
        assert!(!command_ok(&doc! { "ok": 0.0 }));
        assert!(!command_ok(&doc! {}));
    }
}
