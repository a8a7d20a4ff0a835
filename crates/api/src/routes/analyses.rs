//! Route definitions for the `/analyses` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::analysis;
use crate::state::AppState;

/// Routes mounted at `/analyses`.
///
/// ```text
/// GET  /                         -> list_analyses (?analysis_type=, limit, offset)
/// POST /cost-estimation          -> cost_estimation
/// POST /maintenance-prediction   -> maintenance_prediction
/// POST /risk-analysis            -> risk_analysis
/// POST /assist                   -> assist
/// GET  /{id}                     -> get_analysis
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(analysis::list_analyses))
        .route("/cost-estimation", post(analysis::cost_estimation))
        .route(
            "/maintenance-prediction",
            post(analysis::maintenance_prediction),
        )
        .route("/risk-analysis", post(analysis::risk_analysis))
        .route("/assist", post(analysis::assist))
        .route("/{id}", get(analysis::get_analysis))
}
