use axum::{
    Json,
    extract::{Request, State},
    middleware::Next,
    response::IntoResponse,
};
use std::sync::Arc;
use time::OffsetDateTime;
use tower_sessions::{Expiry, Session};

use super::{
    ApiError, ApiResponse, AppState, LoginRequest, MessageResponse, RegisterRequest, validation,
};
use crate::services::UserProfile;

/// Session key holding the authenticated user's id.
const SESSION_USER_KEY: &str = "user_id";

// ============================================================================
// Middleware
// ============================================================================

/// Authentication gate for every protected route.
///
/// Runs before any business logic and short-circuits with 401 when no valid,
/// unexpired session is presented; rejected requests have no side effects.
pub async fn auth_middleware(
    session: Session,
    request: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = session
        .get::<i32>(SESSION_USER_KEY)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?;

    let Some(user_id) = user_id else {
        return Err(ApiError::unauthenticated());
    };

    tracing::Span::current().record("user_id", user_id);
    Ok(next.run(request).await)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
/// Create a user and establish a session for it in the same call.
pub async fn register(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<UserProfile>>, ApiError> {
    let min_password_length = {
        let config = state.config().read().await;
        config.security.min_password_length
    };

    let fields: Vec<_> = [
        validation::validate_name(&payload.name),
        validation::validate_email(&payload.email),
        validation::validate_password(&payload.password, min_password_length),
    ]
    .into_iter()
    .flatten()
    .collect();

    if !fields.is_empty() {
        return Err(ApiError::validation(fields));
    }

    let profile = state
        .auth()
        .register(&payload.name, &payload.email, &payload.password)
        .await?;

    establish_session(&state, &session, profile.id).await?;

    Ok(Json(ApiResponse::success(profile)))
}

/// POST /auth/login
/// Authenticate with email and password.
///
/// Unknown email and wrong password are deliberately indistinguishable.
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<UserProfile>>, ApiError> {
    let profile = state.auth().login(&payload.email, &payload.password).await?;

    establish_session(&state, &session, profile.id).await?;

    Ok(Json(ApiResponse::success(profile)))
}

/// POST /auth/logout
/// Destroy the current session. Idempotent: logging out without a session is
/// not an error; only a backing-store failure surfaces.
pub async fn logout(session: Session) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    session
        .flush()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to destroy session: {e}")))?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Logged out".to_string(),
    })))
}

/// GET /auth/me
/// Public profile for the authenticated session's user.
///
/// Returns 404 when the user record no longer exists; the orphaned session is
/// left intact rather than auto-invalidated.
pub async fn me(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<UserProfile>>, ApiError> {
    let user_id = session_user_id(&session).await?;

    let profile = state.auth().profile(user_id).await?;

    Ok(Json(ApiResponse::success(profile)))
}

// ============================================================================
// Helpers
// ============================================================================

/// Bind the session to a user with a fixed TTL counted from now.
async fn establish_session(
    state: &Arc<AppState>,
    session: &Session,
    user_id: i32,
) -> Result<(), ApiError> {
    let ttl_minutes = {
        let config = state.config().read().await;
        config.server.session_ttl_minutes
    };

    session
        .insert(SESSION_USER_KEY, user_id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

    session.set_expiry(Some(Expiry::AtDateTime(
        OffsetDateTime::now_utc() + time::Duration::minutes(ttl_minutes),
    )));

    Ok(())
}

/// Get the acting user's id from the session, 401 if not authenticated.
pub async fn session_user_id(session: &Session) -> Result<i32, ApiError> {
    session
        .get::<i32>(SESSION_USER_KEY)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?
        .ok_or_else(ApiError::unauthenticated)
}
