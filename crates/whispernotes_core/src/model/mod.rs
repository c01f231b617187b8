//! Domain model for notes.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep one note shape for storage, API payloads and client views.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId`.
//! - Deletion is permanent; there are no tombstones.

pub mod note;
