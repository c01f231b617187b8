//! Note use-case service (the note store contract).
//!
//! # Responsibility
//! - Provide list/get/add/update/remove over any `NoteRepository`.
//! - Stamp ids and timestamps; enforce the empty-note policy.
//!
//! # Invariants
//! - `add` returns a record with `created_at == updated_at`.
//! - `update` strictly increases `updated_at` and leaves storage untouched
//!   when validation fails.
//! - Every successful mutation is committed before it returns.

use crate::filter::{filter_notes, tags_of, NoteFilter};
use crate::model::note::{now_epoch_ms, NewNote, Note, NoteId, NotePatch, NoteValidationError};
use crate::repo::note_repo::NoteRepository;
use crate::repo::RepoError;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// Input violates the note policy.
    Validation(NoteValidationError),
    /// Target note does not exist.
    NoteNotFound(NoteId),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Write succeeded but the read-back disagreed.
    InconsistentState(&'static str),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent note state: {details}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NoteNotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<NoteValidationError> for NoteServiceError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Note store facade over repository implementations.
pub struct NoteService<R: NoteRepository> {
    repo: R,
}

impl<R: NoteRepository> NoteService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// All notes, newest update first.
    pub fn list(&self) -> Result<Vec<Note>, NoteServiceError> {
        Ok(self.repo.list_notes()?)
    }

    /// Notes passing `filter`, in list order.
    pub fn search(&self, filter: &NoteFilter) -> Result<Vec<Note>, NoteServiceError> {
        let notes = self.list()?;
        if filter.is_unconstrained() {
            return Ok(notes);
        }
        Ok(filter_notes(&notes, filter).into_iter().cloned().collect())
    }

    /// Distinct tags across all notes, in list order of first appearance.
    pub fn tags(&self) -> Result<Vec<String>, NoteServiceError> {
        Ok(tags_of(&self.list()?))
    }

    pub fn get(&self, id: NoteId) -> Result<Note, NoteServiceError> {
        self.repo
            .get_note(id)?
            .ok_or(NoteServiceError::NoteNotFound(id))
    }

    /// Creates a note with a fresh id.
    pub fn add(&mut self, new_note: NewNote) -> Result<Note, NoteServiceError> {
        let note = Note::create(new_note, now_epoch_ms()).inspect_err(|err| {
            warn!("event=note_add module=service status=rejected reason={err}");
        })?;
        self.repo.insert_note(&note)?;
        info!(
            "event=note_add module=service status=ok note_id={} tags={}",
            note.id,
            note.tags.len()
        );
        self.read_back(note.id, "created note not found in read-back")
    }

    /// Merges `patch` into an existing note.
    pub fn update(&mut self, id: NoteId, patch: NotePatch) -> Result<Note, NoteServiceError> {
        let current = self.get(id)?;
        let next = current.patched(&patch, now_epoch_ms()).inspect_err(|err| {
            warn!("event=note_update module=service status=rejected note_id={id} reason={err}");
        })?;
        self.repo.replace_note(&next)?;
        info!("event=note_update module=service status=ok note_id={id}");
        self.read_back(id, "updated note not found in read-back")
    }

    /// Deletes a note permanently.
    pub fn remove(&mut self, id: NoteId) -> Result<(), NoteServiceError> {
        self.repo.delete_note(id)?;
        info!("event=note_remove module=service status=ok note_id={id}");
        Ok(())
    }

    fn read_back(&self, id: NoteId, details: &'static str) -> Result<Note, NoteServiceError> {
        self.repo
            .get_note(id)?
            .ok_or(NoteServiceError::InconsistentState(details))
    }
}
