//! Domain service for registration, login, and session-backed identity.
//!
//! Credential handling lives here and in the user repository; business logic
//! above this layer only ever sees user ids and public profiles.

use serde::Serialize;
use thiserror::Error;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email is already registered")]
    DuplicateEmail,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Public profile DTO for responses. Never carries the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: i32,
    pub name: String,
    pub email: String,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates a user with a hashed password and returns the public profile.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::DuplicateEmail`] if the email is already taken.
    async fn register(&self, name: &str, email: &str, password: &str)
    -> Result<UserProfile, AuthError>;

    /// Verifies credentials and returns the public profile.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown email or a
    /// wrong password, without distinguishing the two.
    async fn login(&self, email: &str, password: &str) -> Result<UserProfile, AuthError>;

    /// Resolves an authenticated user id to its public profile.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UserNotFound`] if the record no longer exists
    /// (orphaned session).
    async fn profile(&self, user_id: i32) -> Result<UserProfile, AuthError>;
}
