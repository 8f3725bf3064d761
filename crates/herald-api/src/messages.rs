use axum::{
    Extension, Json,
    extract::{Query, State, rejection::{JsonRejection, QueryRejection}},
};
use serde::Deserialize;

use herald_types::api::{Claims, SendMessageRequest, SendMessageResponse};
use herald_types::models::HistoryEntry;

use crate::auth::AppState;
use crate::convert;
use crate::error::ApiError;

/// Upper bound (and default) for a history page.
pub const HISTORY_LIMIT: u32 = 50;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<u32>,
}

/// Broadcasts one message to the caller's selected groups.
///
/// Partial failure is still a 200; the per-group outcome is in the body.
pub async fn send_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<Json<SendMessageResponse>, ApiError> {
    let Json(req) = payload?;
    let message = req.message.unwrap_or_default();

    let report = state
        .dispatcher
        .broadcast(claims.sub, &message, &req.groups)
        .await?;

    Ok(Json(report.summary()))
}

pub async fn get_history(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<Vec<HistoryEntry>>, ApiError> {
    let Query(query) = query?;
    let limit = query.limit.unwrap_or(HISTORY_LIMIT).min(HISTORY_LIMIT);

    let user_id = claims.sub;
    let rows = state.db(move |db| db.list_history(user_id, limit)).await?;
    Ok(Json(rows.into_iter().map(convert::history_entry).collect()))
}
