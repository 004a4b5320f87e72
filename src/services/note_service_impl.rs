//! `SeaORM` implementation of the `NoteService` trait.

use crate::db::{NewNote, Note, NoteChanges, Store};
use crate::services::note_service::{NoteError, NoteService};
use async_trait::async_trait;

pub const STATUS_TODO: &str = "todo";
pub const STATUS_DONE: &str = "done";

pub struct SeaOrmNoteService {
    store: Store,
}

impl SeaOrmNoteService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl NoteService for SeaOrmNoteService {
    async fn list(&self, user_id: i32) -> Result<Vec<Note>, NoteError> {
        let notes = self.store.list_notes(user_id).await?;
        Ok(notes)
    }

    async fn create(&self, user_id: i32, note: NewNote) -> Result<Note, NoteError> {
        let note = self.store.insert_note(user_id, note).await?;
        Ok(note)
    }

    async fn update(
        &self,
        id: i32,
        user_id: i32,
        changes: NoteChanges,
    ) -> Result<Note, NoteError> {
        self.store
            .update_note_where(id, user_id, changes)
            .await?
            .ok_or(NoteError::NotFound)
    }

    async fn delete(&self, id: i32, user_id: i32) -> Result<(), NoteError> {
        let deleted = self.store.delete_note_where(id, user_id).await?;
        if !deleted {
            return Err(NoteError::NotFound);
        }
        tracing::info!(note_id = id, user_id, "Deleted note");
        Ok(())
    }

    async fn mark_completed(&self, id: i32, user_id: i32) -> Result<Note, NoteError> {
        let today = chrono::Utc::now().date_naive().to_string();
        let changes = NoteChanges {
            status: Some(STATUS_DONE.to_string()),
            completed_date: Some(today),
            ..Default::default()
        };

        self.update(id, user_id, changes).await
    }
}
