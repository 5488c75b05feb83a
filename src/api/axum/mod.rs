//! Axum wiring for the workspace membership API.

mod error;
mod handlers;
mod middleware;
mod routes;

pub use error::AppError;
pub use middleware::{extract_bearer_token, CurrentUser};
pub use routes::{invitation_routes, workspace_routes, AppState};
