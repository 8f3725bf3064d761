use axum::{
    Extension, Json,
    extract::{Path, State, rejection::{JsonRejection, PathRejection}},
};

use herald_types::api::{Claims, MessageResponse, TemplateRequest};
use herald_types::models::Template;

use crate::auth::AppState;
use crate::convert;
use crate::error::ApiError;
use crate::validation::present;

fn name_and_content(req: TemplateRequest) -> Result<(String, String), ApiError> {
    match (present(req.name), present(req.content)) {
        (Some(name), Some(content)) => Ok((name, content)),
        _ => Err(ApiError::validation("Name and content are required")),
    }
}

pub async fn list_templates(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Template>>, ApiError> {
    let rows = state.db(move |db| db.list_templates(claims.sub)).await?;
    Ok(Json(rows.into_iter().map(convert::template).collect()))
}

pub async fn create_template(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<TemplateRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(req) = payload?;
    let (name, content) = name_and_content(req)?;

    let user_id = claims.sub;
    state
        .db(move |db| db.create_template(user_id, &name, &content))
        .await?;

    Ok(Json(MessageResponse::new("Template created successfully")))
}

pub async fn get_template(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Template>, ApiError> {
    let Path(template_id) = path?;
    let user_id = claims.sub;
    let row = state
        .db(move |db| db.get_template(user_id, template_id))
        .await?
        .ok_or(ApiError::NotFound("Template not found"))?;

    Ok(Json(convert::template(row)))
}

pub async fn update_template(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<TemplateRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(template_id) = path?;
    let Json(req) = payload?;
    let (name, content) = name_and_content(req)?;

    let user_id = claims.sub;
    let updated = state
        .db(move |db| db.update_template(user_id, template_id, &name, &content))
        .await?;
    if !updated {
        return Err(ApiError::NotFound("Template not found"));
    }

    Ok(Json(MessageResponse::new("Template updated successfully")))
}

/// Another tenant's template answers exactly like a missing one.
pub async fn delete_template(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(template_id) = path?;
    let user_id = claims.sub;
    let deleted = state
        .db(move |db| db.delete_template(user_id, template_id))
        .await?;
    if !deleted {
        return Err(ApiError::NotFound("Template not found"));
    }

    Ok(Json(MessageResponse::new("Template deleted successfully")))
}
