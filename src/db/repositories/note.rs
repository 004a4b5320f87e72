use crate::entities::{notes, prelude::*};
use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, sea_query::Expr,
};
use tracing::info;

/// Repository for note operations.
///
/// Every read, update, and delete filters by both the note id and the owning
/// user id; a note is never observable or mutable through a non-owner.
pub struct NoteRepository {
    conn: DatabaseConnection,
}

impl NoteRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    // ========================================================================
    // Model Conversion Helpers
    // ========================================================================

    fn map_note_model(n: notes::Model) -> Note {
        Note {
            id: n.id,
            user_id: n.user_id,
            title: n.title,
            created_date: n.created_date,
            completed_date: n.completed_date,
            status: n.status,
        }
    }

    // ========================================================================
    // Note Operations
    // ========================================================================

    pub async fn insert(&self, owner_id: i32, note: NewNote) -> Result<Note> {
        let active = notes::ActiveModel {
            user_id: Set(owner_id),
            title: Set(note.title),
            created_date: Set(note.created_date),
            completed_date: Set(note.completed_date),
            status: Set(note.status),
            ..Default::default()
        };

        let model = active.insert(&self.conn).await?;
        info!("Created note {} for user {}", model.id, owner_id);
        Ok(Self::map_note_model(model))
    }

    pub async fn list_by_owner(&self, owner_id: i32) -> Result<Vec<Note>> {
        let rows = Notes::find()
            .filter(notes::Column::UserId.eq(owner_id))
            .order_by_asc(notes::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Self::map_note_model).collect())
    }

    pub async fn get_where(&self, id: i32, owner_id: i32) -> Result<Option<Note>> {
        let row = Notes::find()
            .filter(notes::Column::Id.eq(id))
            .filter(notes::Column::UserId.eq(owner_id))
            .one(&self.conn)
            .await?;

        Ok(row.map(Self::map_note_model))
    }

    /// Apply the supplied fields to a note matched by id AND owner.
    ///
    /// Returns `None` when no row matched; a missing note and a note owned by
    /// someone else are indistinguishable to the caller.
    pub async fn update_where(
        &self,
        id: i32,
        owner_id: i32,
        changes: NoteChanges,
    ) -> Result<Option<Note>> {
        if changes.is_empty() {
            // Nothing to write; still resolve through the ownership filter
            return self.get_where(id, owner_id).await;
        }

        let mut update = Notes::update_many()
            .filter(notes::Column::Id.eq(id))
            .filter(notes::Column::UserId.eq(owner_id));

        if let Some(title) = changes.title {
            update = update.col_expr(notes::Column::Title, Expr::value(title));
        }
        if let Some(created_date) = changes.created_date {
            update = update.col_expr(notes::Column::CreatedDate, Expr::value(created_date));
        }
        if let Some(completed_date) = changes.completed_date {
            update = update.col_expr(notes::Column::CompletedDate, Expr::value(completed_date));
        }
        if let Some(status) = changes.status {
            update = update.col_expr(notes::Column::Status, Expr::value(status));
        }

        let result = update.exec(&self.conn).await?;
        if result.rows_affected == 0 {
            return Ok(None);
        }

        self.get_where(id, owner_id).await
    }

    /// Delete a note matched by id AND owner. Returns whether a row went away.
    pub async fn delete_where(&self, id: i32, owner_id: i32) -> Result<bool> {
        let result = Notes::delete_many()
            .filter(notes::Column::Id.eq(id))
            .filter(notes::Column::UserId.eq(owner_id))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count(&self) -> Result<u64> {
        let count = Notes::find().count(&self.conn).await?;
        Ok(count)
    }
}

// ============================================================================
// Data Types
// ============================================================================

#[derive(Debug, Clone)]
pub struct Note {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub created_date: String,
    pub completed_date: Option<String>,
    pub status: String,
}

/// Fields for a new note; the owner is supplied separately and is always the
/// authenticated user.
#[derive(Debug, Clone)]
pub struct NewNote {
    pub title: String,
    pub created_date: String,
    pub completed_date: Option<String>,
    pub status: String,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct NoteChanges {
    pub title: Option<String>,
    pub created_date: Option<String>,
    pub completed_date: Option<String>,
    pub status: Option<String>,
}

impl NoteChanges {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.created_date.is_none()
            && self.completed_date.is_none()
            && self.status.is_none()
    }
}
