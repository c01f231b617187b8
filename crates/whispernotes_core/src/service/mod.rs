//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep HTTP and client layers decoupled from storage details.

pub mod note_service;
