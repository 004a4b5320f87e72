use serde::{Deserialize, Serialize};

use crate::db::Note;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Itemized, per-field validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldError>>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            fields: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            fields: None,
        }
    }

    pub fn invalid(fields: Vec<FieldError>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some("Validation failed".to_string()),
            fields: Some(fields),
        }
    }
}

/// One caller-correctable input defect, named by the offending field.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NoteDto {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub created_date: String,
    pub completed_date: Option<String>,
    pub status: String,
}

impl From<Note> for NoteDto {
    fn from(note: Note) -> Self {
        Self {
            id: note.id,
            user_id: note.user_id,
            title: note.title,
            created_date: note.created_date,
            completed_date: note.completed_date,
            status: note.status,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    pub title: String,
    pub created_date: String,
    #[serde(default)]
    pub completed_date: Option<String>,
    pub status: String,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Deserialize)]
pub struct UpdateNoteRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub created_date: Option<String>,
    #[serde(default)]
    pub completed_date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SystemStatusDto {
    pub version: String,
    pub uptime: u64,
    pub database: String,
    pub users: u64,
    pub notes: u64,
}
