//! Terminal client for the WhisperNotes API.

pub mod args;
pub mod commands;
pub mod render;
pub mod transport;

pub use args::{Cli, Command};
pub use commands::run;
pub use transport::HttpTransport;
