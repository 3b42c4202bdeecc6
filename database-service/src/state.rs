//! Application state for database service.

use std::sync::Arc;

use common::config::AppConfig;
use crate::session_registry::SessionRegistry;
use crate::storage::ConnectionProvider;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    /// Session lifecycle (login/logout).
    pub sessions: Arc<SessionRegistry>,
    /// Resolver handed to each per-request service.
    pub provider: Arc<dyn ConnectionProvider>,
}

impl AppState {
    /// Creates a new application state where the registry also resolves sessions.
    pub fn new(config: AppConfig) -> Self {
        let sessions = Arc::new(SessionRegistry::new(config.mongo.clone()));
        Self {
            provider: sessions.clone(),
            sessions,
            config,
        }
    }

    /// Creates a state that resolves sessions through a different provider.
    #[cfg(test)]
    pub fn with_provider(config: AppConfig, provider: Arc<dyn ConnectionProvider>) -> Self {
        Self {
            sessions: Arc::new(SessionRegistry::new(config.mongo.clone())),
            provider,
            config,
        }
    }
}
