//! Route definitions for the `/projects` resource.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::projects;
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                                  -> list_projects
/// POST   /                                  -> create_project
/// GET    /{id}                              -> get_project
/// PUT    /{id}                              -> update_project
/// DELETE /{id}                              -> delete_project (admin)
/// GET    /{id}/phases                       -> list_phases
/// POST   /{id}/phases                       -> create_phase
/// POST   /{id}/contractors                  -> assign_contractor
/// DELETE /{id}/contractors/{contractor_id}  -> unassign_contractor
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(projects::list_projects).post(projects::create_project),
        )
        .route(
            "/{id}",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        .route(
            "/{id}/phases",
            get(projects::list_phases).post(projects::create_phase),
        )
        .route(
            "/{id}/contractors",
            post(projects::assign_contractor),
        )
        .route(
            "/{id}/contractors/{contractor_id}",
            delete(projects::unassign_contractor),
        )
}
