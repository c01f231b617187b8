//! Remote note API contract shared by clients and the HTTP server.

use crate::model::note::{NewNote, Note, NoteId, NotePatch};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Machine-readable error kind carried by non-2xx API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    ValidationError,
    NotFound,
    InternalError,
    #[serde(other)]
    Unknown,
}

impl ApiErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "validation_error",
            Self::NotFound => "not_found",
            Self::InternalError => "internal_error",
            Self::Unknown => "unknown",
        }
    }
}

/// JSON error envelope: `{"error": "<kind>", "message": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorKind,
    pub message: String,
}

/// Failures talking to the remote note API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Request never produced a response (connection refused, timeout...).
    Network(String),
    /// Server answered with a non-success status.
    Rejected {
        status: u16,
        kind: ApiErrorKind,
        message: String,
    },
    /// Response body could not be decoded.
    Malformed(String),
}

impl TransportError {
    pub fn kind(&self) -> Option<&ApiErrorKind> {
        match self {
            Self::Rejected { kind, .. } => Some(kind),
            _ => None,
        }
    }

    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Rejected { status, .. } => *status >= 500,
            Self::Malformed(_) => false,
        }
    }
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network(message) => write!(f, "network error: {message}"),
            Self::Rejected {
                status,
                kind,
                message,
            } => write!(f, "server rejected request ({status} {}): {message}", kind.as_str()),
            Self::Malformed(message) => write!(f, "malformed response: {message}"),
        }
    }
}

impl Error for TransportError {}

/// Remote counterpart of the note store.
pub trait NoteTransport {
    fn list(&self) -> Result<Vec<Note>, TransportError>;
    fn create(&self, new_note: &NewNote) -> Result<Note, TransportError>;
    fn update(&self, id: NoteId, patch: &NotePatch) -> Result<Note, TransportError>;
    fn delete(&self, id: NoteId) -> Result<(), TransportError>;
}
