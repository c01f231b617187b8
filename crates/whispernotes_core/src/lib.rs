//! Core domain logic for WhisperNotes.
//! This crate is the single source of truth for note and theme invariants.

pub mod db;
pub mod editor;
pub mod filter;
pub mod logging;
pub mod model;
pub mod preview;
pub mod repo;
pub mod service;
pub mod sync;
pub mod theme;

pub use editor::{parse_tags, EditorError, EditorMode, EditorOutcome, NoteDraft, NoteEditor, NoteSink};
pub use filter::{filter_notes, tags_of, NoteFilter};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig, LoggingError};
pub use model::note::{NewNote, Note, NoteId, NotePatch, NoteValidationError};
pub use repo::note_repo::{NoteRepository, SqliteNoteRepository};
pub use repo::{RepoError, RepoResult};
pub use service::note_service::{NoteService, NoteServiceError};
pub use sync::{
    ApiError, ApiErrorKind, Applied, NoteTransport, NotesSession, RemoteSink, SessionError,
    TransportError,
};
pub use theme::{Appearance, Theme, ThemeError, ThemePalette, ThemeSelection, ThemeStore};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
