//! Handlers for the audit trail.
//!
//! All endpoints require the admin role.

use axum::extract::{Path, Query, State};
use axum::Json;
use buildwise_core::types::DbId;
use buildwise_db::models::audit::{AuditLog, AuditLogPage, AuditQuery};
use buildwise_db::repositories::AuditLogRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/admin/audit-logs
///
/// Filter by `user_id`, `action`, `entity_type`, `entity_id` and an RFC 3339
/// `from`/`to` window. Newest first; `total` counts every match.
pub async fn query_audit_logs(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<AuditQuery>,
) -> AppResult<Json<DataResponse<AuditLogPage>>> {
    if let (Some(from), Some(to)) = (params.from, params.to) {
        if from > to {
            return Err(AppError::BadRequest("'from' must not be after 'to'".into()));
        }
    }

    let items = AuditLogRepo::query(&state.pool, &params).await?;
    let total = AuditLogRepo::count(&state.pool, &params).await?;
    Ok(Json(DataResponse {
        data: AuditLogPage { items, total },
    }))
}

/// GET /api/v1/admin/audit-logs/{entity_type}/{entity_id}
///
/// Full history of one record, oldest first.
pub async fn entity_history(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path((entity_type, entity_id)): Path<(String, DbId)>,
) -> AppResult<Json<DataResponse<Vec<AuditLog>>>> {
    let entries = AuditLogRepo::list_for_entity(&state.pool, &entity_type, entity_id).await?;
    Ok(Json(DataResponse { data: entries }))
}
