pub mod auth;
pub mod convert;
pub mod error;
pub mod groups;
pub mod messages;
pub mod middleware;
pub mod password;
pub mod routes;
pub mod stats;
pub mod templates;
pub mod token;
pub mod users;
pub mod validation;

pub use auth::{AppState, AppStateInner};
pub use error::ApiError;
pub use routes::router;
