use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::auth::{self, AppState};
use crate::middleware::{require_admin, require_auth};
use crate::{groups, messages, stats, templates, users};

/// Builds the full HTTP surface. Everything lives under `/api`; the health
/// probe is also served at the root.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/health", get(stats::health));

    let user_routes = Router::new()
        .route("/me", get(auth::me).put(auth::update_me))
        .route("/groups", get(groups::list_groups).post(groups::create_group))
        .route("/groups/{id}", put(groups::update_group))
        .route(
            "/templates",
            get(templates::list_templates).post(templates::create_template),
        )
        .route(
            "/templates/{id}",
            get(templates::get_template)
                .put(templates::update_template)
                .delete(templates::delete_template),
        )
        .route("/send_message", post(messages::send_message))
        .route("/history", get(messages::get_history))
        .route("/stats", get(stats::get_stats))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // Layers run outside-in: authenticate first, then check the admin flag.
    let admin_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/users", get(users::list_users))
        .route("/users/{id}", delete(users::delete_user))
        .route("/bot", get(stats::bot_status))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let api = Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .merge(admin_routes);

    Router::new()
        .route("/health", get(stats::health))
        .nest("/api", api)
        .with_state(state)
}
