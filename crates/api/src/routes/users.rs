//! Route definitions for the `/users` directory.

use axum::routing::get;
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET /  -> directory (?role=)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(users::directory))
}
