//! Route definitions for the `/messages` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::messages;
use crate::state::AppState;

/// Routes mounted at `/messages`.
///
/// ```text
/// POST   /                           -> compose
/// GET    /inbox                      -> inbox
/// GET    /sent                       -> sent
/// GET    /unread-count               -> unread_count
/// GET    /conversations              -> conversations
/// GET    /conversations/{user_id}    -> conversation_with
/// POST   /quick                      -> quick_message
/// GET    /attachments/{id}/download  -> download_attachment
/// GET    /{id}                       -> get_message
/// DELETE /{id}                       -> delete_message
/// POST   /{id}/reply                 -> reply
/// POST   /{id}/attachments           -> upload_attachment (multipart)
/// ```
pub fn router(uploads: DefaultBodyLimit) -> Router<AppState> {
    Router::new()
        .route("/", post(messages::compose))
        .route("/inbox", get(messages::inbox))
        .route("/sent", get(messages::sent))
        .route("/unread-count", get(messages::unread_count))
        .route("/conversations", get(messages::conversations))
        .route(
            "/conversations/{user_id}",
            get(messages::conversation_with),
        )
        .route("/quick", post(messages::quick_message))
        .route(
            "/attachments/{id}/download",
            get(messages::download_attachment),
        )
        .route(
            "/{id}",
            get(messages::get_message).delete(messages::delete_message),
        )
        .route("/{id}/reply", post(messages::reply))
        .route(
            "/{id}/attachments",
            post(messages::upload_attachment).layer(uploads),
        )
}
