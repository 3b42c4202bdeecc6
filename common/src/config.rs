//! Service configuration loaded from environment variables.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

/// Settings applied to every MongoDB client the services open.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoSettings {
    /// TCP connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Server selection timeout in seconds.
    pub server_selection_timeout_secs: u64,
    /// Application name reported to the server.
    pub app_name: String,
}

impl Default for MongoSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            server_selection_timeout_secs: 10,
            app_name: "mongo-admin".to_string(),
        }
    }
}

impl MongoSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn server_selection_timeout(&self) -> Duration {
        Duration::from_secs(self.server_selection_timeout_secs)
    }
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Name of the service owning this config, used in logs and responses.
    pub service_name: String,
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Default tracing filter when `RUST_LOG` is not set.
    pub log_level: String,
    pub mongo: MongoSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service_name: "database-service".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8081,
            log_level: "info".to_string(),
            mongo: MongoSettings::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration for the named service from the process environment.
    pub fn load_with_service(service_name: &str) -> AppResult<Self> {
        Self::from_source(service_name, |key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    ///
    /// Unset keys keep their defaults; set but unparsable numeric keys are an error.
    pub fn from_source<F>(service_name: &str, lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self {
            service_name: service_name.to_string(),
            ..Default::default()
        };

        if let Some(host) = lookup("SERVER_HOST") {
            config.host = host;
        }
        if let Some(port) = parse_var(&lookup, "SERVER_PORT")? {
            config.port = port;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            config.log_level = level;
        }
        if let Some(secs) = parse_var(&lookup, "MONGO_CONNECT_TIMEOUT_SECS")? {
            config.mongo.connect_timeout_secs = secs;
        }
        if let Some(secs) = parse_var(&lookup, "MONGO_SERVER_SELECTION_TIMEOUT_SECS")? {
            config.mongo.server_selection_timeout_secs = secs;
        }
        if let Some(name) = lookup("MONGO_APP_NAME") {
            config.mongo.app_name = name;
        }

        Ok(config)
    }

    /// Socket address string for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> AppResult<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| AppError::Config(format!("{} has invalid value '{}'", key, raw))),
        None => Ok(None),
    }
}

/// Loads `KEY=VALUE` lines from a `.env` file (best-effort, no error if missing).
///
/// Variables already present in the environment win. Returns how many were applied.
pub fn load_dotenv(path: impl AsRef<Path>) -> usize {
    let Ok(content) = std::fs::read_to_string(path.as_ref()) else {
        return 0;
    };

    let mut applied = 0;
    for (key, value) in parse_dotenv(&content) {
        if std::env::var(key).is_err() {
            std::env::set_var(key, value);
            applied += 1;
        }
    }
    applied
}

fn parse_dotenv(content: &str) -> impl Iterator<Item = (&str, &str)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim(), value.trim().trim_matches('"')))
}
