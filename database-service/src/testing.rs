//! In-memory storage doubles for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use common::errors::{AppError, AppResult};
use crate::storage::{
    ConnectionProvider, DatabaseHandle, StatsDocument, StorageConnection, StorageError,
};

/// Remote call to fail with an injected transport error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    List,
    Materialize,
    Drop,
    Stats,
}

#[derive(Default)]
struct State {
    databases: Mutex<Vec<String>>,
    stats: Mutex<HashMap<String, StatsDocument>>,
    materialized: Mutex<Vec<String>>,
    dropped: Mutex<Vec<String>>,
    fail_on: Mutex<Option<FailOn>>,
    calls: AtomicUsize,
}

impl State {
    fn enter(&self, op: FailOn) -> Result<(), StorageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_on.lock().unwrap() == Some(op) {
            return Err(StorageError::Transport(format!("injected {:?} failure", op)));
        }
        Ok(())
    }
}

/// Storage server held in memory. Clones share state.
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    state: Arc<State>,
}

impl InMemoryStorage {
    pub fn with_databases(names: &[&str]) -> Self {
        let storage = Self::default();
        *storage.state.databases.lock().unwrap() = names.iter().map(|n| n.to_string()).collect();
        storage
    }

    pub fn set_stats(&self, name: &str, stats: StatsDocument) {
        self.state.stats.lock().unwrap().insert(name.to_string(), stats);
    }

    pub fn fail_on(&self, op: FailOn) {
        *self.state.fail_on.lock().unwrap() = Some(op);
    }

    /// Number of remote calls made so far.
    pub fn remote_calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    pub fn materialized(&self) -> Vec<String> {
        self.state.materialized.lock().unwrap().clone()
    }

    pub fn dropped(&self) -> Vec<String> {
        self.state.dropped.lock().unwrap().clone()
    }
}

#[async_trait]
impl StorageConnection for InMemoryStorage {
    async fn list_database_names(&self) -> Result<Vec<String>, StorageError> {
        self.state.enter(FailOn::List)?;
        Ok(self.state.databases.lock().unwrap().clone())
    }

    fn database(&self, name: &str) -> Box<dyn DatabaseHandle> {
        Box::new(InMemoryDatabase {
            name: name.to_string(),
            state: self.state.clone(),
        })
    }

    async fn drop_database(&self, name: &str) -> Result<(), StorageError> {
        self.state.enter(FailOn::Drop)?;
        self.state.databases.lock().unwrap().retain(|n| n != name);
        self.state.dropped.lock().unwrap().push(name.to_string());
        Ok(())
    }
}

struct InMemoryDatabase {
    name: String,
    state: Arc<State>,
}

#[async_trait]
impl DatabaseHandle for InMemoryDatabase {
    fn name(&self) -> &str {
        &self.name
    }

    async fn force_materialize(&self) -> Result<(), StorageError> {
        self.state.enter(FailOn::Materialize)?;
        let mut databases = self.state.databases.lock().unwrap();
        if !databases.contains(&self.name) {
            databases.push(self.name.clone());
        }
        self.state.materialized.lock().unwrap().push(self.name.clone());
        Ok(())
    }

    async fn stats(&self) -> Result<StatsDocument, StorageError> {
        self.state.enter(FailOn::Stats)?;
        Ok(self
            .state
            .stats
            .lock()
            .unwrap()
            .get(&self.name)
            .cloned()
            .unwrap_or_default())
    }
}

/// Provider over a fixed set of sessions.
#[derive(Default)]
pub struct StaticProvider {
    sessions: HashMap<String, InMemoryStorage>,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(mut self, key: &str, storage: InMemoryStorage) -> Self {
        self.sessions.insert(key.to_string(), storage);
        self
    }
}

#[async_trait]
impl ConnectionProvider for StaticProvider {
    async fn resolve(&self, session_key: &str) -> AppResult<Arc<dyn StorageConnection>> {
        match self.sessions.get(session_key) {
            Some(storage) => Ok(Arc::new(storage.clone())),
            None => Err(AppError::ConnectionUnavailable(format!(
                "no session for [{}]",
                session_key
            ))),
        }
    }
}
