use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use herald_db::DbError;
use herald_dispatch::DispatchError;
use herald_types::api::ErrorResponse;

use crate::password::PasswordError;
use crate::token::TokenError;

/// Every failure a handler can answer with. Rendered as `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("{0}")]
    Forbidden(&'static str),

    /// Also used for resources owned by another tenant.
    #[error("{0}")]
    NotFound(&'static str),

    /// Unique constraint violations. Reported as 400 like other bad input.
    #[error("{0}")]
    Conflict(&'static str),

    #[error("{0}")]
    ServiceUnavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Conflict(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ServiceUnavailable(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::Internal(detail) => {
                error!("Internal error: {}", detail);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::Duplicate("email") => Self::Conflict("Email already registered"),
            DbError::Duplicate("chat_id") => Self::Conflict("Group already exists"),
            DbError::Duplicate(_) => Self::Conflict("Duplicate value"),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<DispatchError> for ApiError {
    fn from(e: DispatchError) -> Self {
        let message = e.to_string();
        match e {
            DispatchError::EmptyMessage | DispatchError::NoGroups => Self::Validation(message),
            DispatchError::NotConfigured => Self::ServiceUnavailable(message),
            DispatchError::Store(db) => db.into(),
            DispatchError::Join(_) => Self::Internal(message),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Expired => Self::Unauthorized("Token expired"),
            TokenError::Invalid => Self::Unauthorized("Invalid token"),
            TokenError::Signing(err) => Self::Internal(format!("token signing failed: {err}")),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(e: PasswordError) -> Self {
        Self::Internal(e.to_string())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::Internal(format!("spawn_blocking join error: {e}"))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        Self::Validation(e.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(e: PathRejection) -> Self {
        Self::Validation(e.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(e: QueryRejection) -> Self {
        Self::Validation(e.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_status_codes() {
        let cases = [
            (ApiError::validation("x"), StatusCode::BAD_REQUEST),
            (ApiError::Conflict("x"), StatusCode::BAD_REQUEST),
            (ApiError::Unauthorized("x"), StatusCode::UNAUTHORIZED),
            (ApiError::Forbidden("x"), StatusCode::FORBIDDEN),
            (ApiError::NotFound("x"), StatusCode::NOT_FOUND),
            (ApiError::ServiceUnavailable("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (ApiError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn duplicates_become_readable_conflicts() {
        let err: ApiError = DbError::Duplicate("chat_id").into();
        assert_eq!(err.to_string(), "Group already exists");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn dispatch_errors_keep_their_message() {
        let err: ApiError = DispatchError::NoGroups.into();
        assert!(matches!(err, ApiError::Validation(ref m) if m == "Select at least one group"));

        let err: ApiError = DispatchError::NotConfigured.into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Bot not configured");
    }
}
