//! SQLite storage bootstrap and schema migration entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the note store.
//! - Apply schema migrations in deterministic order.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Note data is never read or written before migrations succeed.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Note store bootstrap and query failures.
#[derive(Debug)]
pub enum DbError {
    /// The note database file could not be opened or created.
    Open {
        path: PathBuf,
        source: rusqlite::Error,
    },
    /// A schema step failed; the whole batch was rolled back.
    Migration {
        version: u32,
        name: &'static str,
        source: rusqlite::Error,
    },
    /// The database was written by a newer build.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    Sqlite(rusqlite::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { path, source } => {
                write!(f, "cannot open note database `{}`: {source}", path.display())
            }
            Self::Migration {
                version,
                name,
                source,
            } => write!(f, "note schema migration {version} ({name}) failed: {source}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "note database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::Sqlite(err) => write!(f, "note database error: {err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } | Self::Migration { source, .. } => Some(source),
            Self::UnsupportedSchemaVersion { .. } => None,
            Self::Sqlite(err) => Some(err),
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
