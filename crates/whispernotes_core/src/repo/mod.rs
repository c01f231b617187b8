//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes validate notes before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

use crate::db::DbError;
use crate::model::note::{NoteId, NoteValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod note_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for note persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(NoteValidationError),
    Db(DbError),
    NotFound(NoteId),
    InvalidData(String),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted note data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "database is missing required table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "table `{table}` is missing required column `{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<NoteValidationError> for RepoError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
