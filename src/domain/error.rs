// src/domain/error.rs
use crate::domain::ViewMode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Sign in required to {0}")]
    AuthRequired(&'static str),
    #[error("Not permitted: {0}")]
    Forbidden(String),
    #[error("Note not found: {0}")]
    NoteNotFound(String),
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Note is read-only in {0} mode")]
    ReadOnly(ViewMode),
    #[error("Already in progress: {0}")]
    Busy(String),
    #[error("Backend error: {0}")]
    Backend(String),
    /// Listing was written but the source note could not be flagged public.
    /// Publishing again overwrites the listing and retries the flag update.
    #[error("Publish of note {note_id} incomplete: {reason}")]
    PublishIncomplete { note_id: String, reason: String },
    #[error("Malformed content: {0}")]
    MalformedContent(String),
}
