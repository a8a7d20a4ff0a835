//! Handlers for the `/tasks` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use buildwise_core::access::{can_update_task, can_view_task};
use buildwise_core::audit::{actions, entities, status_snapshot};
use buildwise_core::status::{
    is_completed, status_change_label, validate_priority, validate_task_status, PRIORITY_MEDIUM,
};
use buildwise_core::types::DbId;
use buildwise_core::validation::{
    check_max_len, check_non_negative, check_required_len, MAX_TASK_DESCRIPTION_LEN, MAX_TITLE_LEN,
};
use buildwise_db::models::notification::CreateNotification;
use buildwise_db::models::task::{CreateTask, CreateTaskUpdate, Task, TaskStatusChange, TaskUpdate};
use buildwise_db::repositories::{TaskRepo, UserRepo};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{forbidden, not_found, validate};
use crate::audit::AuditEvent;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::client::ClientInfo;
use crate::middleware::rbac::{RequireContractor, RequireStaff};
use crate::notifications::notify;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /tasks`.
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub due_date: NaiveDate,
    pub priority: Option<String>,
    #[serde(default)]
    pub estimated_cost: f64,
    pub project_phase_id: Option<DbId>,
    pub maintenance_request_id: Option<DbId>,
    pub assigned_to_id: DbId,
}

/// Request body for `POST /tasks/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct TaskStatusRequest {
    pub status: String,
    pub notes: Option<String>,
    pub actual_cost: Option<f64>,
}

/// Task with its update history, newest first.
#[derive(Debug, Serialize)]
pub struct TaskDetail {
    #[serde(flatten)]
    pub task: Task,
    pub updates: Vec<TaskUpdate>,
}

pub(crate) async fn load_visible_task(state: &AppState, auth: &AuthUser, id: DbId) -> AppResult<Task> {
    let task = TaskRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Task", id))?;
    if !can_view_task(auth.viewer(), task.assigned_to_id, task.created_by_id) {
        return Err(forbidden("You do not have access to this task"));
    }
    Ok(task)
}

/// GET /api/v1/tasks
///
/// Staff see every task; other roles the tasks assigned to or created by them.
pub async fn list_tasks(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Task>>>> {
    let tasks = TaskRepo::list_for_viewer(
        &state.pool,
        auth.user_id,
        &auth.role,
        params.limit(),
        params.offset(),
    )
    .await?;
    Ok(Json(DataResponse { data: tasks }))
}

/// GET /api/v1/tasks/mine
pub async fn my_tasks(
    State(state): State<AppState>,
    RequireContractor(auth): RequireContractor,
) -> AppResult<Json<DataResponse<Vec<Task>>>> {
    let tasks = TaskRepo::list_assigned_to(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: tasks }))
}

/// POST /api/v1/tasks
///
/// Creates the task in `Pending` and notifies the assignee.
pub async fn create_task(
    State(state): State<AppState>,
    RequireStaff(auth): RequireStaff,
    client: ClientInfo,
    Json(input): Json<CreateTaskRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Task>>)> {
    validate(check_required_len("Title", &input.title, MAX_TITLE_LEN))?;
    validate(check_max_len("Description", &input.description, MAX_TASK_DESCRIPTION_LEN))?;
    validate(check_non_negative("Estimated cost", input.estimated_cost))?;
    let priority = input.priority.unwrap_or_else(|| PRIORITY_MEDIUM.to_string());
    validate(validate_priority(&priority))?;

    let assignee = UserRepo::find_by_id(&state.pool, input.assigned_to_id)
        .await?
        .ok_or_else(|| not_found("User", input.assigned_to_id))?;
    if !assignee.is_active {
        return Err(AppError::BadRequest(format!(
            "User {} is deactivated and cannot be assigned work",
            assignee.id
        )));
    }

    let task = TaskRepo::create(
        &state.pool,
        &CreateTask {
            title: input.title.trim().to_string(),
            description: input.description,
            due_date: input.due_date,
            priority,
            estimated_cost: input.estimated_cost,
            project_phase_id: input.project_phase_id,
            maintenance_request_id: input.maintenance_request_id,
            assigned_to_id: assignee.id,
            created_by_id: auth.user_id,
        },
    )
    .await?;

    notify(
        &state.pool,
        CreateNotification::in_app(
            assignee.id,
            "New Task Assigned",
            format!("You have been assigned a new task: '{}'.", task.title),
        )
        .for_task(task.id),
    )
    .await;

    AuditEvent::new(entities::TASK, task.id, actions::CREATE)
        .by(auth.user_id)
        .client(&client)
        .after(&task)
        .record(&state.pool)
        .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: task })))
}

/// GET /api/v1/tasks/{id}
pub async fn get_task(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<TaskDetail>>> {
    let task = load_visible_task(&state, &auth, id).await?;
    let updates = TaskRepo::list_updates(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: TaskDetail { task, updates },
    }))
}

/// POST /api/v1/tasks/{id}/status
///
/// Staff or the assignee move the task to a new status. Every change is
/// recorded as a task update; moving to `Completed` stamps `completed_at`.
pub async fn update_task_status(
    State(state): State<AppState>,
    auth: AuthUser,
    client: ClientInfo,
    Path(id): Path<DbId>,
    Json(input): Json<TaskStatusRequest>,
) -> AppResult<Json<DataResponse<Task>>> {
    // 1. Validate input.
    validate(validate_task_status(&input.status))?;
    if let Some(cost) = input.actual_cost {
        validate(check_non_negative("Actual cost", cost))?;
    }

    // 2. Load and authorize.
    let before = TaskRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Task", id))?;
    if !can_update_task(auth.viewer(), before.assigned_to_id) {
        return Err(forbidden("Only staff or the assignee can update this task"));
    }

    // 3. Apply the change together with its history row.
    let description = input
        .notes
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| format!("Status updated to {}", input.status));
    let history = CreateTaskUpdate {
        updated_by_id: auth.user_id,
        description,
        status_change: Some(status_change_label(&before.status, &input.status)),
        cost_update: input.actual_cost,
    };
    let completed_at = is_completed(&input.status).then(Utc::now);
    let change = TaskStatusChange {
        status: input.status,
        actual_cost: input.actual_cost,
        completed_at,
    };
    let task = TaskRepo::update_status(&state.pool, id, &change, &history)
        .await?
        .ok_or_else(|| not_found("Task", id))?;

    AuditEvent::new(entities::TASK, id, actions::STATUS_UPDATE)
        .by(auth.user_id)
        .client(&client)
        .old_values(status_snapshot(&before.status))
        .new_values(status_snapshot(&task.status))
        .record(&state.pool)
        .await;

    Ok(Json(DataResponse { data: task }))
}
