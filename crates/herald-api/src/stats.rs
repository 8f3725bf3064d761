use axum::{Extension, Json, extract::State};
use tracing::warn;

use herald_types::api::{Claims, HealthResponse};
use herald_types::models::{BotStatus, Stats};

use crate::auth::AppState;
use crate::error::ApiError;

pub async fn get_stats(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Stats>, ApiError> {
    let user_id = claims.sub;
    let stats = state.db(move |db| db.stats_for(user_id)).await?;
    Ok(Json(stats))
}

/// Reports whether a bot is configured and, if so, who it is.
///
/// A failed lookup is reported in the body rather than as an error status.
pub async fn bot_status(State(state): State<AppState>) -> Json<BotStatus> {
    let Some(sender) = state.dispatcher.sender() else {
        return Json(BotStatus {
            configured: false,
            bot: None,
            error: None,
        });
    };

    let status = match sender.identity().await {
        Ok(bot) => BotStatus {
            configured: true,
            bot,
            error: None,
        },
        Err(e) => {
            warn!("Bot identity lookup failed: {}", e);
            BotStatus {
                configured: true,
                bot: None,
                error: Some(e.to_string()),
            }
        }
    };
    Json(status)
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: chrono::Utc::now(),
    })
}
