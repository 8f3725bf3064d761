use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
};
use tracing::{info, warn};

use herald_db::{Database, DbError};
use herald_dispatch::Dispatcher;
use herald_types::api::{
    Claims, LoginRequest, LoginResponse, MessageResponse, RegisterRequest, UpdateProfileRequest,
};
use herald_types::models::UserProfile;

use crate::convert;
use crate::error::ApiError;
use crate::password::{hash_password, verify_password};
use crate::token::TokenService;
use crate::validation::{check_password, present};

/// Account created on first start; the only admin until more are added.
pub const BOOTSTRAP_ADMIN_EMAIL: &str = "admin@example.com";
pub const BOOTSTRAP_ADMIN_NAME: &str = "Admin";

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Arc<Database>,
    pub tokens: TokenService,
    pub dispatcher: Dispatcher,
}

impl AppStateInner {
    /// Runs a store call off the async runtime.
    pub async fn db<F, T>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Database) -> herald_db::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        Ok(tokio::task::spawn_blocking(move || f(db.as_ref())).await??)
    }
}

/// Runs CPU-heavy work (password hashing) off the async runtime.
pub(crate) async fn blocking<F, T>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await?
}

/// Creates the bootstrap admin unless an account with its email exists.
/// Returns whether a row was inserted.
pub fn bootstrap_admin(db: &Database, password: &str) -> anyhow::Result<bool> {
    if db.get_user_by_email(BOOTSTRAP_ADMIN_EMAIL)?.is_some() {
        return Ok(false);
    }

    let password_hash = hash_password(password)?;
    match db.create_user(
        Some(BOOTSTRAP_ADMIN_NAME),
        BOOTSTRAP_ADMIN_EMAIL,
        &password_hash,
        true,
    ) {
        Ok(id) => {
            info!("Bootstrap admin created (id {}, email {})", id, BOOTSTRAP_ADMIN_EMAIL);
            Ok(true)
        }
        // Another process won the race.
        Err(DbError::Duplicate(_)) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(req) = payload?;
    let (Some(email), Some(password)) = (present(req.email), present(req.password)) else {
        return Err(ApiError::validation("Email and password are required"));
    };

    let user = state
        .db(move |db| db.get_user_by_email(&email))
        .await?
        .ok_or(ApiError::Unauthorized("Invalid credentials"))?;

    let stored = user.password_hash.clone();
    if !blocking(move || Ok(verify_password(&password, &stored)?)).await? {
        warn!("Failed login for {}", user.email);
        return Err(ApiError::Unauthorized("Invalid credentials"));
    }

    let token = state.tokens.issue(&user)?;
    info!("User {} logged in", user.id);

    Ok(Json(LoginResponse {
        token,
        user: convert::user_summary(&user),
    }))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<UserProfile>, ApiError> {
    let user_id = claims.sub;
    let user = state
        .db(move |db| db.get_user_by_id(user_id))
        .await?
        .ok_or(ApiError::NotFound("User not found"))?;

    Ok(Json(convert::user_profile(user)))
}

pub async fn update_me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(req) = payload?;
    let name = present(req.name);
    let password = present(req.password);

    if let Some(password) = &password {
        check_password(password)?;
    }
    if name.is_none() && password.is_none() {
        return Err(ApiError::validation("Nothing to update"));
    }

    let password_hash = match password {
        Some(password) => Some(blocking(move || Ok(hash_password(&password)?)).await?),
        None => None,
    };

    let user_id = claims.sub;
    let updated = state
        .db(move |db| db.update_user_profile(user_id, name.as_deref(), password_hash.as_deref()))
        .await?;
    if !updated {
        return Err(ApiError::NotFound("User not found"));
    }

    info!("User {} updated their profile", user_id);
    Ok(Json(MessageResponse::new("Profile updated successfully")))
}

/// Admin-only: creates a regular (non-admin) account.
pub async fn register(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(req) = payload?;
    let (Some(email), Some(password)) = (present(req.email), present(req.password)) else {
        return Err(ApiError::validation("Email and password are required"));
    };
    check_password(&password)?;
    let name = present(req.name);

    let password_hash = blocking(move || Ok(hash_password(&password)?)).await?;
    let id = state
        .db(move |db| db.create_user(name.as_deref(), &email, &password_hash, false))
        .await?;

    info!("Admin {} registered user {}", claims.sub, id);
    Ok(Json(MessageResponse::new("User created successfully")))
}
