use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use herald_types::api::Claims;

use crate::auth::AppState;
use crate::error::ApiError;

/// Extract and validate the session token from the Authorization header.
///
/// The `Bearer ` prefix is optional. On success the verified [`Claims`] are
/// inserted into the request extensions for downstream handlers.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(bearer_token)
        .filter(|t| !t.is_empty())
        .ok_or(ApiError::Unauthorized("Missing token"))?;

    let claims = state.tokens.verify(token).map_err(|e| {
        debug!("Rejected token: {}", e);
        ApiError::from(e)
    })?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Must be layered inside `require_auth`.
pub async fn require_admin(req: Request, next: Next) -> Result<Response, ApiError> {
    let claims = req
        .extensions()
        .get::<Claims>()
        .ok_or(ApiError::Unauthorized("Missing token"))?;

    if !claims.is_admin {
        debug!("User {} denied admin route {}", claims.sub, req.uri().path());
        return Err(ApiError::Forbidden("Admin access required"));
    }

    Ok(next.run(req).await)
}

fn bearer_token(value: &str) -> &str {
    value.strip_prefix("Bearer ").unwrap_or(value).trim()
}
