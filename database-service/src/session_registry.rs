//! Session registry.
//!
//! Binds session keys to live MongoDB connections. The registry is owned by
//! the HTTP state and is the only place sessions are opened or torn down;
//! [`DatabaseAdminService`](crate::service::DatabaseAdminService) only
//! resolves through it.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mongodb::options::{ClientOptions, Credential, ServerAddress};
use mongodb::Client;
use tokio::sync::RwLock;
use validator::Validate;

use common::config::MongoSettings;
use common::errors::{AppError, AppResult};
use common::models::session::{LoginRequest, SessionItem};
use crate::mongo::MongoStorage;
use crate::storage::{ConnectionProvider, StorageConnection};

/// Live sessions indexed by session key.
pub struct SessionRegistry {
    settings: MongoSettings,
    sessions: RwLock<HashMap<String, Arc<MongoStorage>>>,
}

impl SessionRegistry {
    pub fn new(settings: MongoSettings) -> Self {
        Self {
            settings,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Opens a connection for the login and stores it under its session key.
    ///
    /// The server must answer a ping before the session is registered. A
    /// second login with the same key replaces the earlier connection.
    pub async fn connect(&self, req: &LoginRequest) -> AppResult<SessionItem> {
        req.validate()?;

        let options = self.client_options(req);
        let client = Client::with_options(options)
            .map_err(|e| AppError::ConnectionUnavailable(e.to_string()))?;
        let storage = MongoStorage::new(client);

        if let Err(e) = storage.ping().await {
            storage.shutdown().await;
            tracing::warn!(host = %req.host, port = req.port(), error = %e, "MongoDB ping failed");
            return Err(AppError::ConnectionUnavailable(e.to_string()));
        }

        let item = SessionItem::from(req);
        self.register(item.session_key.clone(), storage).await;
        tracing::info!(session = %item.session_key, "Session opened");
        Ok(item)
    }

    /// Stores a connection, shutting down any connection it replaces.
    pub(crate) async fn register(&self, session_key: String, storage: MongoStorage) {
        let previous = self
            .sessions
            .write()
            .await
            .insert(session_key.clone(), Arc::new(storage));

        if let Some(previous) = previous {
            tracing::info!(session = %session_key, "Replacing existing session connection");
            previous.shutdown().await;
        }
    }

    /// Removes a session and closes its connection.
    pub async fn disconnect(&self, session_key: &str) -> AppResult<()> {
        let removed = self.sessions.write().await.remove(session_key);
        match removed {
            Some(storage) => {
                storage.shutdown().await;
                tracing::info!(session = %session_key, "Session closed");
                Ok(())
            }
            None => Err(unknown_session(session_key)),
        }
    }

    /// Number of open sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn client_options(&self, req: &LoginRequest) -> ClientOptions {
        let mut options = ClientOptions::builder()
            .hosts(vec![server_address(req)])
            .build();

        options.app_name = Some(self.settings.app_name.clone());
        options.connect_timeout = Some(self.settings.connect_timeout());
        options.server_selection_timeout = Some(self.settings.server_selection_timeout());

        if let Some(username) = req.username() {
            let mut credential = Credential::default();
            credential.username = Some(username.to_string());
            credential.password = req.password.clone();
            options.credential = Some(credential);
        }

        options
    }
}

#[async_trait]
impl ConnectionProvider for SessionRegistry {
    async fn resolve(&self, session_key: &str) -> AppResult<Arc<dyn StorageConnection>> {
        if session_key.is_empty() {
            return Err(AppError::ConnectionUnavailable("session key is empty".into()));
        }

        let sessions = self.sessions.read().await;
        match sessions.get(session_key) {
            Some(storage) => {
                let conn: Arc<dyn StorageConnection> = storage.clone();
                Ok(conn)
            }
            None => Err(unknown_session(session_key)),
        }
    }
}

fn unknown_session(session_key: &str) -> AppError {
    AppError::ConnectionUnavailable(format!("no session for [{}]", session_key))
}

/// The single server a session dials. Credentials travel in `ClientOptions`.
fn server_address(req: &LoginRequest) -> ServerAddress {
    ServerAddress::Tcp {
        host: req.server_host().to_string(),
        port: Some(req.port()),
    }
}
