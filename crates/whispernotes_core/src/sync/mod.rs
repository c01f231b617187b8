//! Remote store access for clients.
//!
//! # Responsibility
//! - Define the transport contract for the REST note API.
//! - Reconcile optimistic local changes with server confirmations.

pub mod session;
pub mod transport;

pub use session::{Applied, NotesSession, RemoteSink, SessionError, Ticket};
pub use transport::{ApiError, ApiErrorKind, NoteTransport, TransportError};
