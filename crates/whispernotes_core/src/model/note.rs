//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical note record shared by store, API and clients.
//! - Own tag normalization and the empty-note validation policy.
//!
//! # Invariants
//! - `id` is stable and never reused for another note.
//! - `tags` holds trimmed, non-empty, distinct labels in insertion order.
//! - `updated_at` strictly increases on every mutation.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stable identifier of a note.
pub type NoteId = Uuid;

/// Canonical note record.
///
/// Serialized with camelCase field names (`createdAt`, `updatedAt`), which is
/// the wire shape of the REST API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds. Never earlier than `created_at`.
    pub updated_at: i64,
}

/// Input for note creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNote {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NewNote {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            tags: Vec::new(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// Partial update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl NotePatch {
    pub fn title(value: impl Into<String>) -> Self {
        Self {
            title: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.tags.is_none()
    }
}

/// Validation failures for note payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteValidationError {
    /// Title and content are both blank.
    EmptyNote,
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyNote => write!(f, "a note needs a title or some content"),
        }
    }
}

impl Error for NoteValidationError {}

impl Note {
    /// Builds a fresh note with a generated id and `created_at == updated_at`.
    pub fn create(new_note: NewNote, now_ms: i64) -> Result<Self, NoteValidationError> {
        let note = Self {
            id: Uuid::new_v4(),
            title: new_note.title,
            content: new_note.content,
            tags: normalize_tags(&new_note.tags),
            created_at: now_ms,
            updated_at: now_ms,
        };
        note.validate()?;
        Ok(note)
    }

    /// Checks the empty-note policy.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        validate_fields(&self.title, &self.content)
    }

    /// Returns a copy with `patch` merged in and `updated_at` bumped.
    ///
    /// The receiver is left untouched so callers can keep the previous
    /// version for rollback or comparison.
    pub fn patched(&self, patch: &NotePatch, now_ms: i64) -> Result<Self, NoteValidationError> {
        let mut next = self.clone();
        if let Some(title) = patch.title.as_ref() {
            next.title = title.clone();
        }
        if let Some(content) = patch.content.as_ref() {
            next.content = content.clone();
        }
        if let Some(tags) = patch.tags.as_ref() {
            next.tags = normalize_tags(tags);
        }
        next.validate()?;
        next.updated_at = next_timestamp(self.updated_at, now_ms);
        Ok(next)
    }

    /// Exact tag membership.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|value| value == tag)
    }
}

/// Rejects notes whose title and content are both blank.
pub fn validate_fields(title: &str, content: &str) -> Result<(), NoteValidationError> {
    if title.trim().is_empty() && content.trim().is_empty() {
        return Err(NoteValidationError::EmptyNote);
    }
    Ok(())
}

/// Normalizes one tag label. Blank labels yield `None`.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Trims, drops blanks and removes duplicates keeping first occurrence.
pub fn normalize_tags<S: AsRef<str>>(tags: &[S]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        if let Some(value) = normalize_tag(tag.as_ref()) {
            if !unique.contains(&value) {
                unique.push(value);
            }
        }
    }
    unique
}

/// Current wall clock in epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}

/// Picks an update timestamp strictly greater than `previous`.
pub fn next_timestamp(previous: i64, now_ms: i64) -> i64 {
    now_ms.max(previous.saturating_add(1))
}
