//! Route definitions for the `/tasks` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::tasks;
use crate::state::AppState;

/// Routes mounted at `/tasks`.
///
/// ```text
/// GET  /             -> list_tasks
/// POST /             -> create_task
/// GET  /mine         -> my_tasks (contractor)
/// GET  /{id}         -> get_task
/// POST /{id}/status  -> update_task_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(tasks::list_tasks).post(tasks::create_task))
        .route("/mine", get(tasks::my_tasks))
        .route("/{id}", get(tasks::get_task))
        .route("/{id}/status", post(tasks::update_task_status))
}
