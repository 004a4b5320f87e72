//! Domain service for owner-scoped note operations.
//!
//! Every operation takes the acting user's id explicitly; no operation
//! accepts a caller-supplied owner, and no operation can observe another
//! user's notes.

use thiserror::Error;

use crate::db::{NewNote, Note, NoteChanges};

/// Errors specific to note operations.
#[derive(Debug, Error)]
pub enum NoteError {
    /// The note does not exist or belongs to another user; the two cases are
    /// deliberately indistinguishable.
    #[error("Note not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for NoteError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for NoteError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Domain service trait for notes.
#[async_trait::async_trait]
pub trait NoteService: Send + Sync {
    /// All notes owned by `user_id`, in insertion order.
    async fn list(&self, user_id: i32) -> Result<Vec<Note>, NoteError>;

    /// Persists a note with the owner forced to `user_id`.
    async fn create(&self, user_id: i32, note: NewNote) -> Result<Note, NoteError>;

    /// Applies only the supplied fields to a note matched by id and owner.
    ///
    /// # Errors
    ///
    /// Returns [`NoteError::NotFound`] when no row matched.
    async fn update(&self, id: i32, user_id: i32, changes: NoteChanges)
    -> Result<Note, NoteError>;

    /// Deletes a note matched by id and owner. Immediate and permanent.
    async fn delete(&self, id: i32, user_id: i32) -> Result<(), NoteError>;

    /// Sets status to `done` and stamps the completion date with today.
    /// Calling it again re-stamps the date.
    async fn mark_completed(&self, id: i32, user_id: i32) -> Result<Note, NoteError>;
}
