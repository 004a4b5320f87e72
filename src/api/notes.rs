use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::session_user_id;
use super::{
    ApiError, ApiResponse, AppState, CreateNoteRequest, MessageResponse, NoteDto,
    UpdateNoteRequest, validation,
};
use crate::db::{NewNote, NoteChanges};

/// GET /notes
/// All notes owned by the authenticated user, in insertion order.
pub async fn list_notes(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<Vec<NoteDto>>>, ApiError> {
    let user_id = session_user_id(&session).await?;

    let notes = state.notes().list(user_id).await?;

    Ok(Json(ApiResponse::success(
        notes.into_iter().map(NoteDto::from).collect(),
    )))
}

/// POST /notes
/// Create a note; the owner is always the authenticated user, never client
/// input.
pub async fn create_note(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<CreateNoteRequest>,
) -> Result<Json<ApiResponse<NoteDto>>, ApiError> {
    let user_id = session_user_id(&session).await?;

    let mut fields: Vec<_> = [
        validation::validate_title(&payload.title),
        validation::validate_status(&payload.status),
        validation::validate_date("created_date", &payload.created_date),
    ]
    .into_iter()
    .flatten()
    .collect();

    if let Some(completed_date) = &payload.completed_date {
        fields.extend(validation::validate_date("completed_date", completed_date));
    }

    if !fields.is_empty() {
        return Err(ApiError::validation(fields));
    }

    let note = state
        .notes()
        .create(
            user_id,
            NewNote {
                title: payload.title,
                created_date: payload.created_date,
                completed_date: payload.completed_date,
                status: payload.status,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(NoteDto::from(note))))
}

/// PATCH /notes/{id}
/// Apply only the supplied fields. 404 when the note does not exist or is
/// owned by someone else; the two are indistinguishable.
pub async fn update_note(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateNoteRequest>,
) -> Result<Json<ApiResponse<NoteDto>>, ApiError> {
    let user_id = session_user_id(&session).await?;

    let mut fields = Vec::new();
    if let Some(title) = &payload.title {
        fields.extend(validation::validate_title(title));
    }
    if let Some(status) = &payload.status {
        fields.extend(validation::validate_status(status));
    }
    if let Some(created_date) = &payload.created_date {
        fields.extend(validation::validate_date("created_date", created_date));
    }
    if let Some(completed_date) = &payload.completed_date {
        fields.extend(validation::validate_date("completed_date", completed_date));
    }

    if !fields.is_empty() {
        return Err(ApiError::validation(fields));
    }

    let note = state
        .notes()
        .update(
            id,
            user_id,
            NoteChanges {
                title: payload.title,
                created_date: payload.created_date,
                completed_date: payload.completed_date,
                status: payload.status,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(NoteDto::from(note))))
}

/// DELETE /notes/{id}
/// Immediate, permanent deletion under the same id+owner matching rule.
pub async fn delete_note(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let user_id = session_user_id(&session).await?;

    state.notes().delete(id, user_id).await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: format!("Note {} deleted", id),
    })))
}

/// POST /notes/{id}/complete
/// Set status to done and stamp the completion date with today.
pub async fn complete_note(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<NoteDto>>, ApiError> {
    let user_id = session_user_id(&session).await?;

    let note = state.notes().mark_completed(id, user_id).await?;

    Ok(Json(ApiResponse::success(NoteDto::from(note))))
}
