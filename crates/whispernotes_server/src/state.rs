//! Shared handler state.
//!
//! # Invariants
//! - One SQLite connection per process, reached only through `with_notes`.
//! - Locks are never held across an `.await`.

use crate::error::AppError;
use anyhow::anyhow;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use whispernotes_core::{
    NoteService, NoteServiceError, SqliteNoteRepository, ThemeStore,
};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

struct Inner {
    conn: Mutex<Connection>,
    themes: Mutex<ThemeStore>,
}

impl AppState {
    /// Wraps a migrated connection. See `whispernotes_core::db::open_db`.
    pub fn new(conn: Connection) -> Self {
        Self::with_theme_store(conn, ThemeStore::new())
    }

    pub fn with_theme_store(conn: Connection, themes: ThemeStore) -> Self {
        Self {
            inner: Arc::new(Inner {
                conn: Mutex::new(conn),
                themes: Mutex::new(themes),
            }),
        }
    }

    /// Runs one note use-case against the store.
    pub fn with_notes<T, F>(&self, op: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut NoteService<SqliteNoteRepository<'_>>) -> Result<T, NoteServiceError>,
    {
        let mut conn = self
            .inner
            .conn
            .lock()
            .map_err(|_| AppError::Internal(anyhow!("note store lock poisoned")))?;
        let repo = SqliteNoteRepository::try_new(&mut conn)
            .map_err(|err| AppError::Internal(anyhow::Error::new(err)))?;
        let mut service = NoteService::new(repo);
        Ok(op(&mut service)?)
    }

    pub fn with_themes<T>(&self, op: impl FnOnce(&mut ThemeStore) -> T) -> Result<T, AppError> {
        let mut themes = self
            .inner
            .themes
            .lock()
            .map_err(|_| AppError::Internal(anyhow!("theme store lock poisoned")))?;
        Ok(op(&mut themes))
    }
}
