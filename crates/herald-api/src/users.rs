use axum::{
    Extension, Json,
    extract::{Path, State, rejection::PathRejection},
};
use tracing::info;

use herald_types::api::{Claims, MessageResponse};
use herald_types::models::UserProfile;

use crate::auth::AppState;
use crate::convert;
use crate::error::ApiError;

pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserProfile>>, ApiError> {
    let rows = state.db(|db| db.list_users()).await?;
    Ok(Json(rows.into_iter().map(convert::user_profile).collect()))
}

/// Admins can delete regular accounts only, and never themselves.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(user_id) = path?;
    if user_id == claims.sub {
        return Err(ApiError::validation("Admin cannot delete themselves"));
    }

    let deleted = state.db(move |db| db.delete_non_admin_user(user_id)).await?;
    if !deleted {
        return Err(ApiError::NotFound("User not found or is an admin"));
    }

    info!("Admin {} deleted user {}", claims.sub, user_id);
    Ok(Json(MessageResponse::new("User deleted successfully")))
}
