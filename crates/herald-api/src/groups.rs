use axum::{
    Extension, Json,
    extract::{Path, State, rejection::{JsonRejection, PathRejection}},
};
use tracing::info;

use herald_types::api::{Claims, CreateGroupRequest, MessageResponse, UpdateGroupRequest};
use herald_types::models::Group;

use crate::auth::AppState;
use crate::convert;
use crate::error::ApiError;
use crate::validation::present;

pub async fn list_groups(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Group>>, ApiError> {
    let rows = state.db(move |db| db.list_groups(claims.sub)).await?;
    Ok(Json(rows.into_iter().map(convert::group).collect()))
}

pub async fn create_group(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<CreateGroupRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(req) = payload?;
    let (Some(chat_id), Some(name)) = (present(req.chat_id), present(req.name)) else {
        return Err(ApiError::validation("Chat ID and name are required"));
    };

    let user_id = claims.sub;
    let id = state
        .db(move |db| db.create_group(user_id, &chat_id, &name))
        .await?;

    info!("User {} added group {}", user_id, id);
    Ok(Json(MessageResponse::new("Group added successfully")))
}

/// Turns a group on or off as a broadcast target.
pub async fn update_group(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateGroupRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(group_id) = path?;
    let Json(req) = payload?;
    let active = req
        .active
        .ok_or_else(|| ApiError::validation("Field 'active' is required"))?;

    let user_id = claims.sub;
    let updated = state
        .db(move |db| db.set_group_active(user_id, group_id, active))
        .await?;
    if !updated {
        return Err(ApiError::NotFound("Group not found"));
    }

    Ok(Json(MessageResponse::new("Group updated successfully")))
}
