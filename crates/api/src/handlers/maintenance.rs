//! Handlers for the `/maintenance` resource (client maintenance requests).

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use buildwise_core::access::{can_update_maintenance, can_view_maintenance};
use buildwise_core::audit::{actions, entities, status_snapshot};
use buildwise_core::status::{
    is_completed, status_change_label, validate_maintenance_status, validate_one_of,
    validate_priority, DOCUMENT_MAINTENANCE_ATTACHMENT, PRIORITY_MEDIUM, PROPERTY_TYPES,
};
use buildwise_core::types::DbId;
use buildwise_core::uploads::{validate_document_extension, MAINTENANCE_DIR};
use buildwise_core::validation::{
    check_max_len, check_non_negative, check_optional_len, check_required_len,
    MAX_MAINTENANCE_LOCATION_LEN, MAX_TASK_DESCRIPTION_LEN, MAX_TITLE_LEN,
};
use buildwise_db::models::document::{CreateDocument, Document};
use buildwise_db::models::maintenance::{
    CreateMaintenanceRequest, CreateMaintenanceUpdate, MaintenanceRequest, MaintenanceUpdate,
    UpdateMaintenanceRequest,
};
use buildwise_db::models::notification::CreateNotification;
use buildwise_db::models::task::Task;
use buildwise_db::repositories::{DocumentRepo, MaintenanceRepo, TaskRepo, UserRepo};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{forbidden, not_found, validate};
use crate::audit::AuditEvent;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::client::ClientInfo;
use crate::middleware::rbac::{RequireClient, RequireStaff};
use crate::notifications::{notify, notify_project_managers};
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::storage::{discard_upload, read_multipart, save_upload};

/// Request body for `POST /maintenance`.
#[derive(Debug, Deserialize)]
pub struct CreateMaintenanceBody {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub priority: Option<String>,
    #[serde(default)]
    pub location: String,
    pub property_type: Option<String>,
    pub project_id: Option<DbId>,
    pub due_date: Option<NaiveDate>,
}

/// Request body for `POST /maintenance/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct MaintenanceStatusRequest {
    pub status: String,
    pub notes: Option<String>,
}

/// Request with its history, linked tasks and attachments.
#[derive(Debug, Serialize)]
pub struct MaintenanceDetail {
    #[serde(flatten)]
    pub request: MaintenanceRequest,
    pub updates: Vec<MaintenanceUpdate>,
    pub tasks: Vec<Task>,
    pub attachments: Vec<Document>,
}

pub(crate) async fn load_visible_request(
    state: &AppState,
    auth: &AuthUser,
    id: DbId,
) -> AppResult<MaintenanceRequest> {
    let request = MaintenanceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("MaintenanceRequest", id))?;
    if !can_view_maintenance(auth.viewer(), request.client_id, request.assigned_to_id) {
        return Err(forbidden("You do not have access to this maintenance request"));
    }
    Ok(request)
}

fn validate_property_type(property_type: Option<&str>) -> AppResult<()> {
    match property_type {
        Some(p) => validate(validate_one_of("property type", p, PROPERTY_TYPES)),
        None => Ok(()),
    }
}

/// GET /api/v1/maintenance
///
/// Staff see every request; clients their own; contractors the ones
/// assigned to them.
pub async fn list_requests(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<MaintenanceRequest>>>> {
    let requests = MaintenanceRepo::list_for_viewer(
        &state.pool,
        auth.user_id,
        &auth.role,
        params.limit(),
        params.offset(),
    )
    .await?;
    Ok(Json(DataResponse { data: requests }))
}

/// GET /api/v1/maintenance/mine
pub async fn my_requests(
    State(state): State<AppState>,
    RequireClient(auth): RequireClient,
) -> AppResult<Json<DataResponse<Vec<MaintenanceRequest>>>> {
    let requests = MaintenanceRepo::list_for_client(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: requests }))
}

/// POST /api/v1/maintenance
///
/// A client submits a request. It starts `Pending` and every active project
/// manager is notified.
pub async fn create_request(
    State(state): State<AppState>,
    RequireClient(auth): RequireClient,
    client: ClientInfo,
    Json(input): Json<CreateMaintenanceBody>,
) -> AppResult<(StatusCode, Json<DataResponse<MaintenanceRequest>>)> {
    validate(check_required_len("Title", &input.title, MAX_TITLE_LEN))?;
    validate(check_max_len("Description", &input.description, MAX_TASK_DESCRIPTION_LEN))?;
    validate(check_max_len("Location", &input.location, MAX_MAINTENANCE_LOCATION_LEN))?;
    validate_property_type(input.property_type.as_deref())?;
    let priority = input.priority.unwrap_or_else(|| PRIORITY_MEDIUM.to_string());
    validate(validate_priority(&priority))?;

    let submitter = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| not_found("User", auth.user_id))?;

    let request = MaintenanceRepo::create(
        &state.pool,
        &CreateMaintenanceRequest {
            title: input.title.trim().to_string(),
            description: input.description,
            priority,
            location: input.location,
            property_type: input.property_type,
            project_id: input.project_id,
            client_id: auth.user_id,
            due_date: input.due_date,
        },
    )
    .await?;
    tracing::info!(maintenance_request_id = request.id, client_id = auth.user_id, "Maintenance request submitted");

    notify_project_managers(
        &state.pool,
        CreateNotification::in_app(
            0,
            "New Maintenance Request",
            format!(
                "A new maintenance request '{}' has been submitted by {}.",
                request.title,
                submitter.full_name()
            ),
        )
        .for_maintenance_request(request.id),
    )
    .await;

    AuditEvent::new(entities::MAINTENANCE_REQUEST, request.id, actions::CREATE)
        .by(auth.user_id)
        .client(&client)
        .after(&request)
        .record(&state.pool)
        .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: request })))
}

/// GET /api/v1/maintenance/{id}
pub async fn get_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<MaintenanceDetail>>> {
    let request = load_visible_request(&state, &auth, id).await?;
    let updates = MaintenanceRepo::list_updates(&state.pool, id).await?;
    let tasks = TaskRepo::list_by_maintenance_request(&state.pool, id).await?;
    let attachments = DocumentRepo::list_by_maintenance_request(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: MaintenanceDetail {
            request,
            updates,
            tasks,
            attachments,
        },
    }))
}

/// PUT /api/v1/maintenance/{id}
///
/// Staff edit the request and assign it. A new assignee is notified.
pub async fn update_request(
    State(state): State<AppState>,
    RequireStaff(auth): RequireStaff,
    client: ClientInfo,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateMaintenanceRequest>,
) -> AppResult<Json<DataResponse<MaintenanceRequest>>> {
    if let Some(title) = input.title.as_deref() {
        validate(check_required_len("Title", title, MAX_TITLE_LEN))?;
    }
    validate(check_optional_len("Description", input.description.as_deref(), MAX_TASK_DESCRIPTION_LEN))?;
    validate(check_optional_len("Location", input.location.as_deref(), MAX_MAINTENANCE_LOCATION_LEN))?;
    validate_property_type(input.property_type.as_deref())?;
    if let Some(priority) = input.priority.as_deref() {
        validate(validate_priority(priority))?;
    }
    for (field, value) in [
        ("Estimated cost", input.estimated_cost),
        ("Actual cost", input.actual_cost),
    ] {
        if let Some(v) = value {
            validate(check_non_negative(field, v))?;
        }
    }

    let before = MaintenanceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("MaintenanceRequest", id))?;
    if let Some(assignee_id) = input.assigned_to_id {
        let assignee = UserRepo::find_by_id(&state.pool, assignee_id)
            .await?
            .ok_or_else(|| not_found("User", assignee_id))?;
        if !assignee.is_active {
            return Err(AppError::BadRequest(format!(
                "User {assignee_id} is deactivated and cannot be assigned work"
            )));
        }
    }

    let request = MaintenanceRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found("MaintenanceRequest", id))?;

    if let Some(assignee_id) = request.assigned_to_id {
        if before.assigned_to_id != Some(assignee_id) {
            notify(
                &state.pool,
                CreateNotification::in_app(
                    assignee_id,
                    "Maintenance Request Assigned",
                    format!(
                        "You have been assigned to maintenance request '{}'.",
                        request.title
                    ),
                )
                .for_maintenance_request(request.id),
            )
            .await;
        }
    }

    AuditEvent::new(entities::MAINTENANCE_REQUEST, id, actions::UPDATE)
        .by(auth.user_id)
        .client(&client)
        .before(&before)
        .after(&request)
        .record(&state.pool)
        .await;

    Ok(Json(DataResponse { data: request }))
}

/// POST /api/v1/maintenance/{id}/status
///
/// Staff or the assignee change the status. Each change is recorded as a
/// maintenance update; `Completed` stamps `completed_at`.
pub async fn update_request_status(
    State(state): State<AppState>,
    auth: AuthUser,
    client: ClientInfo,
    Path(id): Path<DbId>,
    Json(input): Json<MaintenanceStatusRequest>,
) -> AppResult<Json<DataResponse<MaintenanceRequest>>> {
    validate(validate_maintenance_status(&input.status))?;

    let before = MaintenanceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("MaintenanceRequest", id))?;
    if !can_update_maintenance(auth.viewer(), before.assigned_to_id) {
        return Err(forbidden("Only staff or the assignee can update this request"));
    }

    let description = input
        .notes
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| format!("Status updated to {}", input.status));
    let history = CreateMaintenanceUpdate {
        updated_by_id: auth.user_id,
        description,
        status_change: Some(status_change_label(&before.status, &input.status)),
    };
    let completed_at = is_completed(&input.status).then(Utc::now);
    let request =
        MaintenanceRepo::update_status(&state.pool, id, &input.status, completed_at, &history)
            .await?
            .ok_or_else(|| not_found("MaintenanceRequest", id))?;

    AuditEvent::new(entities::MAINTENANCE_REQUEST, id, actions::STATUS_UPDATE)
        .by(auth.user_id)
        .client(&client)
        .old_values(status_snapshot(&before.status))
        .new_values(status_snapshot(&request.status))
        .record(&state.pool)
        .await;

    Ok(Json(DataResponse { data: request }))
}

/// POST /api/v1/maintenance/{id}/attachments
///
/// Multipart upload (`file`, optional `description`) stored as a
/// `MaintenanceAttachment` document.
pub async fn upload_attachment(
    State(state): State<AppState>,
    auth: AuthUser,
    client: ClientInfo,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<Document>>)> {
    let request = load_visible_request(&state, &auth, id).await?;

    let mut form = read_multipart(multipart).await?;
    let file = form.take_file()?;
    validate(validate_document_extension(&file.file_name).map(|_| ()))?;

    let description = form.text("description").unwrap_or_default();
    validate(check_max_len("Description", &description, MAX_TASK_DESCRIPTION_LEN))?;

    let stored = save_upload(&state.config.upload_dir, MAINTENANCE_DIR, &file).await?;
    let created = DocumentRepo::create(
        &state.pool,
        &CreateDocument {
            name: file.file_name.clone(),
            description,
            file_name: stored.stored_name,
            file_path: stored.relative_path.clone(),
            file_type: stored.file_type,
            file_size: stored.file_size,
            document_type: DOCUMENT_MAINTENANCE_ATTACHMENT.to_string(),
            project_id: request.project_id,
            task_id: None,
            maintenance_request_id: Some(request.id),
            uploaded_by_id: auth.user_id,
        },
    )
    .await;
    let document = match created {
        Ok(document) => document,
        Err(e) => {
            discard_upload(&state.config.upload_dir, &stored.relative_path).await;
            return Err(e.into());
        }
    };

    AuditEvent::new(entities::DOCUMENT, document.id, actions::UPLOAD)
        .by(auth.user_id)
        .client(&client)
        .after(&document)
        .record(&state.pool)
        .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: document })))
}
