//! Route definitions for the `/maintenance` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::maintenance;
use crate::state::AppState;

/// Routes mounted at `/maintenance`.
///
/// ```text
/// GET  /                  -> list_requests
/// POST /                  -> create_request
/// GET  /mine              -> my_requests (client)
/// GET  /{id}              -> get_request
/// PUT  /{id}              -> update_request (staff)
/// POST /{id}/status       -> update_request_status
/// POST /{id}/attachments  -> upload_attachment (multipart)
/// ```
pub fn router(uploads: DefaultBodyLimit) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(maintenance::list_requests).post(maintenance::create_request),
        )
        .route("/mine", get(maintenance::my_requests))
        .route(
            "/{id}",
            get(maintenance::get_request).put(maintenance::update_request),
        )
        .route("/{id}/status", post(maintenance::update_request_status))
        .route(
            "/{id}/attachments",
            post(maintenance::upload_attachment).layer(uploads),
        )
}
