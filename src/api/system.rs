use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, SystemStatusDto};

/// GET /system/status
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<SystemStatusDto>>, ApiError> {
    let database = if state.store().ping().await.is_ok() {
        "ok"
    } else {
        "unavailable"
    };

    let users = state.store().count_users().await?;
    let notes = state.store().count_notes().await?;

    Ok(Json(ApiResponse::success(SystemStatusDto {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: state.start_time.elapsed().as_secs(),
        database: database.to_string(),
        users,
        notes,
    })))
}
