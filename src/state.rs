//! Shared application state.
//!
//! One `AppState` is built at startup and shared (via `Arc`) by every
//! request handler. It owns the database *path*, not a connection: each
//! request opens its own connection, runs a handful of statements, and
//! drops it, which is the access pattern the page scripts had. The only
//! long-lived mutable state is the session store.

use std::path::PathBuf;
use std::sync::{RwLock, RwLockWriteGuard};

use thiserror::Error;

use crate::config;
use crate::db::{self, DatabaseError};
use crate::session::SessionStore;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("Session store lock poisoned")]
    LockPoisoned,
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

pub struct AppState {
    pub db_path: PathBuf,
    sessions: RwLock<SessionStore>,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_db_path(config::database_path())
    }

    pub fn with_db_path(db_path: PathBuf) -> Self {
        Self {
            db_path,
            sessions: RwLock::new(SessionStore::new()),
        }
    }

    /// Open a fresh connection to the clinic database.
    pub fn open_db(&self) -> Result<rusqlite::Connection, StateError> {
        db::open_database(&self.db_path).map_err(StateError::Database)
    }

    /// Acquire the session store. Validation mutates (activity clock,
    /// wizard state), so there is no read-only path.
    pub fn sessions(&self) -> Result<RwLockWriteGuard<'_, SessionStore>, StateError> {
        self.sessions.write().map_err(|_| StateError::LockPoisoned)
    }
}
