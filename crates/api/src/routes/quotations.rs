//! Route definitions for the `/quotations` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::quotations;
use crate::state::AppState;

/// Routes mounted at `/quotations`.
///
/// ```text
/// GET  /               -> list_quotations
/// POST /               -> create_quotation
/// GET  /{id}           -> get_quotation
/// POST /{id}/status    -> update_quotation_status
/// POST /{id}/invoice   -> create_invoice_from_quotation
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(quotations::list_quotations).post(quotations::create_quotation),
        )
        .route("/{id}", get(quotations::get_quotation))
        .route("/{id}/status", post(quotations::update_quotation_status))
        .route(
            "/{id}/invoice",
            post(quotations::create_invoice_from_quotation),
        )
}
