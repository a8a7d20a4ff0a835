//! Route definitions for the `/documents` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::documents;
use crate::state::AppState;

/// Routes mounted at `/documents`.
///
/// ```text
/// GET    /                -> list_documents
/// POST   /                -> upload_document (multipart)
/// GET    /{id}            -> get_document
/// DELETE /{id}            -> delete_document
/// GET    /{id}/download   -> download_document
/// ```
pub fn router(uploads: DefaultBodyLimit) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(documents::list_documents)
                .merge(post(documents::upload_document).layer(uploads)),
        )
        .route(
            "/{id}",
            get(documents::get_document).delete(documents::delete_document),
        )
        .route("/{id}/download", get(documents::download_document))
}
