//! Note editor: draft collection, validation and submission.
//!
//! # Responsibility
//! - Hold the draft for a create or edit session.
//! - Turn the freeform tag input into normalized labels.
//! - Submit to any [`NoteSink`] and report completion to the caller.
//!
//! # Invariants
//! - An invalid draft never reaches the sink.
//! - `cancel` never reaches the sink.
//! - A failed submit keeps the draft so the user can retry.
//! - Editing leaves tags untouched unless the tag input was changed.

use crate::model::note::{
    normalize_tags, validate_fields, NewNote, Note, NoteId, NotePatch, NoteValidationError,
};
use crate::service::note_service::{NoteService, NoteServiceError};
use crate::repo::note_repo::NoteRepository;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Destination of editor submissions.
pub trait NoteSink {
    type Error;

    fn add_note(&mut self, new_note: NewNote) -> Result<Note, Self::Error>;
    fn update_note(&mut self, id: NoteId, patch: NotePatch) -> Result<Note, Self::Error>;
}

impl<R: NoteRepository> NoteSink for NoteService<R> {
    type Error = NoteServiceError;

    fn add_note(&mut self, new_note: NewNote) -> Result<Note, Self::Error> {
        self.add(new_note)
    }

    fn update_note(&mut self, id: NoteId, patch: NotePatch) -> Result<Note, Self::Error> {
        self.update(id, patch)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    Create,
    Edit(NoteId),
}

/// Raw user input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    /// Comma or newline separated labels.
    pub tags_input: String,
}

impl NoteDraft {
    pub fn tags(&self) -> Vec<String> {
        parse_tags(&self.tags_input)
    }
}

/// What a successful submit produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorOutcome {
    Created(Note),
    Updated(Note),
}

impl EditorOutcome {
    pub fn note(&self) -> &Note {
        match self {
            Self::Created(note) | Self::Updated(note) => note,
        }
    }
}

#[derive(Debug)]
pub enum EditorError<E> {
    /// Draft failed validation; nothing was submitted.
    Invalid(NoteValidationError),
    /// Editor was already submitted or cancelled.
    Closed,
    /// The sink refused the submission.
    Store(E),
}

impl<E: Display> Display for EditorError<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(err) => write!(f, "{err}"),
            Self::Closed => write!(f, "editor is closed"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl<E: Error + 'static> Error for EditorError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(err) => Some(err),
            Self::Closed => None,
            Self::Store(err) => Some(err),
        }
    }
}

/// Editing surface state for one note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteEditor {
    mode: EditorMode,
    draft: NoteDraft,
    /// Tag input as pre-filled for an edit.
    initial_tags_input: String,
    open: bool,
}

impl NoteEditor {
    /// Opens an empty editor for a new note.
    pub fn create() -> Self {
        Self {
            mode: EditorMode::Create,
            draft: NoteDraft::default(),
            initial_tags_input: String::new(),
            open: true,
        }
    }

    /// Opens an editor bound to `note`, pre-filled with its fields.
    pub fn edit(note: &Note) -> Self {
        let tags_input = format_tags(&note.tags);
        Self {
            mode: EditorMode::Edit(note.id),
            draft: NoteDraft {
                title: note.title.clone(),
                content: note.content.clone(),
                tags_input: tags_input.clone(),
            },
            initial_tags_input: tags_input,
            open: true,
        }
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn draft(&self) -> &NoteDraft {
        &self.draft
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.draft.title = title.into();
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.draft.content = content.into();
    }

    pub fn set_tags_input(&mut self, input: impl Into<String>) {
        self.draft.tags_input = input.into();
    }

    pub fn validate(&self) -> Result<(), NoteValidationError> {
        validate_fields(&self.draft.title, &self.draft.content)
    }

    /// Validates and sends the draft to `sink`.
    ///
    /// On success the editor closes and its draft is cleared.
    pub fn submit<S: NoteSink>(
        &mut self,
        sink: &mut S,
    ) -> Result<EditorOutcome, EditorError<S::Error>> {
        if !self.open {
            return Err(EditorError::Closed);
        }
        self.validate().map_err(EditorError::Invalid)?;

        let outcome = match self.mode {
            EditorMode::Create => {
                let new_note = NewNote {
                    title: self.draft.title.clone(),
                    content: self.draft.content.clone(),
                    tags: self.draft.tags(),
                };
                EditorOutcome::Created(sink.add_note(new_note).map_err(EditorError::Store)?)
            }
            EditorMode::Edit(id) => {
                // The joined form is lossy for labels containing separators.
                let tags = (self.draft.tags_input != self.initial_tags_input)
                    .then(|| self.draft.tags());
                let patch = NotePatch {
                    title: Some(self.draft.title.clone()),
                    content: Some(self.draft.content.clone()),
                    tags,
                };
                EditorOutcome::Updated(sink.update_note(id, patch).map_err(EditorError::Store)?)
            }
        };

        self.close();
        Ok(outcome)
    }

    /// Discards the draft without touching any store.
    pub fn cancel(&mut self) {
        self.close();
    }

    fn close(&mut self) {
        self.draft = NoteDraft::default();
        self.initial_tags_input.clear();
        self.open = false;
    }
}

/// Splits freeform tag input on commas and newlines into normalized labels.
pub fn parse_tags(input: &str) -> Vec<String> {
    let parts: Vec<&str> = input.split([',', '\n']).collect();
    normalize_tags(&parts)
}

/// Inverse of [`parse_tags`] for pre-filling an edit draft.
pub fn format_tags(tags: &[String]) -> String {
    tags.join(", ")
}
