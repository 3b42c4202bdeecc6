//! 数据库管理服务模块
//!
//! 每个请求按会话构造一个 [`DatabaseAdminService`]。每个操作在入口处重新解析
//! 会话对应的连接，先校验参数，再执行一次逻辑上的远程交互。
//!
//! 存在性检查与随后的创建/删除之间没有原子性：并发调用方可能同时通过检查，
//! 此时由服务器自身决定第二次操作的结果。

use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use serde_json::{Map, Number, Value};

use common::errors::{AppError, AppResult};
use common::models::StatEntry;
use crate::storage::{ConnectionProvider, StatValue, StorageConnection, StorageError};

/// 数据库管理服务 Trait
#[async_trait]
pub trait DatabaseAdmin: Send + Sync {
    /// 列出服务器上的所有数据库
    async fn list_databases(&self) -> AppResult<Vec<String>>;

    /// 创建数据库
    async fn create_database(&self, name: &str) -> AppResult<String>;

    /// 删除数据库
    async fn drop_database(&self, name: &str) -> AppResult<String>;

    /// 获取数据库统计信息
    async fn get_stats(&self, name: &str) -> AppResult<Vec<StatEntry>>;
}

/// 绑定到单个会话的数据库管理服务
pub struct DatabaseAdminService {
    provider: Arc<dyn ConnectionProvider>,
    session_key: String,
}

impl DatabaseAdminService {
    /// 创建绑定到指定会话的服务实例
    pub fn new(provider: Arc<dyn ConnectionProvider>, session_key: impl Into<String>) -> Self {
        Self {
            provider,
            session_key: session_key.into(),
        }
    }

    async fn connection(&self) -> AppResult<Arc<dyn StorageConnection>> {
        self.provider.resolve(&self.session_key).await
    }
}

#[async_trait]
impl DatabaseAdmin for DatabaseAdminService {
    async fn list_databases(&self) -> AppResult<Vec<String>> {
        let conn = self.connection().await?;
        let names = conn
            .list_database_names()
            .await
            .map_err(|e| AppError::DatabaseList(e.to_string()))?;

        tracing::debug!(session = %self.session_key, count = names.len(), "数据库列表已获取");
        Ok(names)
    }

    async fn create_database(&self, name: &str) -> AppResult<String> {
        validate_name(name)?;
        let conn = self.connection().await?;

        let exists = database_exists(conn.as_ref(), name)
            .await
            .map_err(|e| AppError::DatabaseCreation(e.to_string()))?;
        if exists {
            return Err(AppError::DuplicateDatabase(name.to_string()));
        }

        conn.database(name)
            .force_materialize()
            .await
            .map_err(|e| AppError::DatabaseCreation(e.to_string()))?;

        tracing::info!(session = %self.session_key, db = %name, "数据库已创建");
        Ok(format!("Created DB with name [{}]", name))
    }

    async fn drop_database(&self, name: &str) -> AppResult<String> {
        validate_name(name)?;
        let conn = self.connection().await?;

        let exists = database_exists(conn.as_ref(), name)
            .await
            .map_err(|e| AppError::DatabaseDeletion(e.to_string()))?;
        if !exists {
            return Err(AppError::UndefinedDatabase(name.to_string()));
        }

        conn.drop_database(name)
            .await
            .map_err(|e| AppError::DatabaseDeletion(e.to_string()))?;

        tracing::info!(session = %self.session_key, db = %name, "数据库已删除");
        Ok(format!("Deleted DB with name [{}]", name))
    }

    async fn get_stats(&self, name: &str) -> AppResult<Vec<StatEntry>> {
        validate_name(name)?;
        let conn = self.connection().await?;

        let exists = database_exists(conn.as_ref(), name)
            .await
            .map_err(|e| AppError::DatabaseStats(e.to_string()))?;
        if !exists {
            return Err(AppError::UndefinedDatabase(name.to_string()));
        }

        let handle = conn.database(name);
        let stats = handle
            .stats()
            .await
            .map_err(|e| AppError::DatabaseStats(e.to_string()))?;

        tracing::debug!(session = %self.session_key, db = handle.name(), keys = stats.len(), "统计信息已获取");

        // 编码失败直接返回，不包装为远程错误
        stats
            .iter()
            .map(|(key, value)| encode_stat(key, value))
            .collect()
    }
}

fn validate_name(name: &str) -> AppResult<()> {
    if name.is_empty() {
        return Err(AppError::EmptyDatabaseName);
    }
    Ok(())
}

async fn database_exists(conn: &dyn StorageConnection, name: &str) -> Result<bool, StorageError> {
    let names = conn.list_database_names().await?;
    Ok(names.iter().any(|n| n == name))
}

/// Builds one report row from a stat pair.
pub fn encode_stat(key: &str, value: &StatValue) -> AppResult<StatEntry> {
    Ok(StatEntry::new(key, stringify(value)?, short_type_name(value)))
}

/// Short type name reported for a stat value.
pub fn short_type_name(value: &StatValue) -> &'static str {
    match value {
        StatValue::Null => "Null",
        StatValue::Boolean(_) => "Boolean",
        StatValue::Int32(_) => "Integer",
        StatValue::Int64(_) => "Long",
        StatValue::Double(_) => "Double",
        StatValue::String(_) => "String",
        StatValue::DateTime(_) => "Date",
        StatValue::Timestamp { .. } => "BSONTimestamp",
        StatValue::ObjectId(_) => "ObjectId",
        StatValue::Document(_) => "BasicDBObject",
        StatValue::Array(_) => "BasicDBList",
        StatValue::Other(_) => "Object",
    }
}

fn stringify(value: &StatValue) -> AppResult<String> {
    let text = match value {
        StatValue::Null => "null".to_string(),
        StatValue::Boolean(v) => v.to_string(),
        StatValue::Int32(v) => v.to_string(),
        StatValue::Int64(v) => v.to_string(),
        StatValue::Double(v) => format_double(*v),
        StatValue::String(v) => v.clone(),
        StatValue::DateTime(ms) => format_millis(*ms),
        StatValue::Timestamp { time, increment } => format!("Timestamp({}, {})", time, increment),
        StatValue::ObjectId(hex) => hex.clone(),
        StatValue::Document(_) | StatValue::Array(_) => to_json(value)?.to_string(),
        StatValue::Other(text) => text.clone(),
    };
    Ok(text)
}

/// Doubles always keep a fractional part: `1.0`, not `1`.
fn format_double(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_infinite() {
        let text = if v > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else {
        format!("{:?}", v)
    }
}

fn format_millis(ms: i64) -> String {
    DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| ms.to_string())
}

fn to_json(value: &StatValue) -> AppResult<Value> {
    let json = match value {
        StatValue::Null => Value::Null,
        StatValue::Boolean(v) => Value::Bool(*v),
        StatValue::Int32(v) => Value::from(*v),
        StatValue::Int64(v) => Value::from(*v),
        StatValue::Double(v) => Number::from_f64(*v)
            .map(Value::Number)
            .ok_or_else(|| AppError::Encoding(format!("non-finite number {} in nested value", v)))?,
        StatValue::String(v) | StatValue::Other(v) => Value::String(v.clone()),
        StatValue::DateTime(ms) => Value::String(format_millis(*ms)),
        StatValue::Timestamp { time, increment } => {
            serde_json::json!({ "$timestamp": { "t": time, "i": increment } })
        }
        StatValue::ObjectId(hex) => serde_json::json!({ "$oid": hex }),
        StatValue::Document(fields) => {
            let mut map = Map::with_capacity(fields.len());
            for (key, field) in fields {
                map.insert(key.clone(), to_json(field)?);
            }
            Value::Object(map)
        }
        StatValue::Array(items) => Value::Array(items.iter().map(to_json).collect::<AppResult<_>>()?),
    };
    Ok(json)
}
