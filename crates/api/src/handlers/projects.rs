//! Handlers for the `/projects` resource, its phases and contractor
//! assignments.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use buildwise_core::access::{can_manage_project, can_view_project};
use buildwise_core::audit::{actions, entities};
use buildwise_core::roles::{ROLE_CONTRACTOR, ROLE_PROJECT_MANAGER};
use buildwise_core::status::validate_project_status;
use buildwise_core::types::DbId;
use buildwise_core::validation::{
    check_date_range, check_max_len, check_non_negative, check_optional_len, check_required_len,
    MAX_PROJECT_DESCRIPTION_LEN, MAX_PROJECT_LOCATION_LEN, MAX_PROJECT_NAME_LEN,
};
use buildwise_db::models::project::{
    AssignContractor, CreatePhase, CreateProject, Project, ProjectContractor,
    ProjectContractorView, ProjectPhase, UpdateProject,
};
use buildwise_db::repositories::{ProjectContractorRepo, ProjectPhaseRepo, ProjectRepo, UserRepo};
use serde::Serialize;

use super::{forbidden, not_found, validate};
use crate::audit::AuditEvent;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::client::ClientInfo;
use crate::middleware::rbac::{RequireAdmin, RequireStaff};
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Project with its phases and active contractor assignments.
#[derive(Debug, Serialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub phases: Vec<ProjectPhase>,
    pub contractors: Vec<ProjectContractorView>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load a project and check the caller may see it.
pub(crate) async fn load_visible_project(
    state: &AppState,
    auth: &AuthUser,
    id: DbId,
) -> AppResult<Project> {
    let project = ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Project", id))?;
    let contractor_ids = ProjectContractorRepo::contractor_ids(&state.pool, id).await?;
    if !can_view_project(
        auth.viewer(),
        project.project_manager_id,
        project.client_id,
        &contractor_ids,
    ) {
        return Err(forbidden("You do not have access to this project"));
    }
    Ok(project)
}

/// Load a project and check the caller may change it.
async fn load_managed_project(state: &AppState, auth: &AuthUser, id: DbId) -> AppResult<Project> {
    let project = ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Project", id))?;
    if !can_manage_project(auth.viewer(), project.project_manager_id) {
        return Err(forbidden("Only an admin or the project's manager can change it"));
    }
    Ok(project)
}

fn validate_new_project(input: &CreateProject) -> AppResult<()> {
    validate(check_required_len("Project name", &input.name, MAX_PROJECT_NAME_LEN))?;
    validate(check_max_len("Description", &input.description, MAX_PROJECT_DESCRIPTION_LEN))?;
    validate(check_max_len("Location", &input.location, MAX_PROJECT_LOCATION_LEN))?;
    validate(check_date_range(input.start_date, input.end_date))?;
    validate(check_non_negative("Budget", input.budget))
}

fn validate_project_update(existing: &Project, input: &UpdateProject) -> AppResult<()> {
    if let Some(name) = input.name.as_deref() {
        validate(check_required_len("Project name", name, MAX_PROJECT_NAME_LEN))?;
    }
    validate(check_optional_len("Description", input.description.as_deref(), MAX_PROJECT_DESCRIPTION_LEN))?;
    validate(check_optional_len("Location", input.location.as_deref(), MAX_PROJECT_LOCATION_LEN))?;
    if let Some(status) = input.status.as_deref() {
        validate(validate_project_status(status))?;
    }
    if let Some(budget) = input.budget {
        validate(check_non_negative("Budget", budget))?;
    }
    if let Some(cost) = input.actual_cost {
        validate(check_non_negative("Actual cost", cost))?;
    }
    validate(check_date_range(
        input.start_date.unwrap_or(existing.start_date),
        input.end_date.unwrap_or(existing.end_date),
    ))
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

/// GET /api/v1/projects
///
/// Admins see every project; project managers the ones they manage; clients
/// their own; contractors the ones they are assigned to.
pub async fn list_projects(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Project>>>> {
    let projects = ProjectRepo::list_for_viewer(
        &state.pool,
        auth.user_id,
        &auth.role,
        params.limit(),
        params.offset(),
    )
    .await?;
    Ok(Json(DataResponse { data: projects }))
}

/// POST /api/v1/projects
///
/// New projects start in `Planning`. A project manager who leaves the
/// manager blank is recorded as the manager.
pub async fn create_project(
    State(state): State<AppState>,
    RequireStaff(auth): RequireStaff,
    client: ClientInfo,
    Json(mut input): Json<CreateProject>,
) -> AppResult<(StatusCode, Json<DataResponse<Project>>)> {
    validate_new_project(&input)?;
    if input.project_manager_id.is_none() && auth.role == ROLE_PROJECT_MANAGER {
        input.project_manager_id = Some(auth.user_id);
    }

    let project = ProjectRepo::create(&state.pool, &input).await?;
    tracing::info!(project_id = project.id, user_id = auth.user_id, "Project created");

    AuditEvent::new(entities::PROJECT, project.id, actions::CREATE)
        .by(auth.user_id)
        .client(&client)
        .after(&project)
        .record(&state.pool)
        .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: project })))
}

/// GET /api/v1/projects/{id}
pub async fn get_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ProjectDetail>>> {
    let project = load_visible_project(&state, &auth, id).await?;
    let phases = ProjectPhaseRepo::list_by_project(&state.pool, id).await?;
    let contractors = ProjectContractorRepo::list_by_project(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: ProjectDetail {
            project,
            phases,
            contractors,
        },
    }))
}

/// PUT /api/v1/projects/{id}
pub async fn update_project(
    State(state): State<AppState>,
    auth: AuthUser,
    client: ClientInfo,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProject>,
) -> AppResult<Json<DataResponse<Project>>> {
    let before = load_managed_project(&state, &auth, id).await?;
    validate_project_update(&before, &input)?;

    let project = ProjectRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found("Project", id))?;

    AuditEvent::new(entities::PROJECT, id, actions::UPDATE)
        .by(auth.user_id)
        .client(&client)
        .before(&before)
        .after(&project)
        .record(&state.pool)
        .await;

    Ok(Json(DataResponse { data: project }))
}

/// DELETE /api/v1/projects/{id}
pub async fn delete_project(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    client: ClientInfo,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let before = ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Project", id))?;
    if !ProjectRepo::delete(&state.pool, id).await? {
        return Err(not_found("Project", id));
    }
    tracing::info!(project_id = id, user_id = admin.user_id, "Project deleted");

    AuditEvent::new(entities::PROJECT, id, actions::DELETE)
        .by(admin.user_id)
        .client(&client)
        .before(&before)
        .record(&state.pool)
        .await;

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Phases
// ---------------------------------------------------------------------------

/// GET /api/v1/projects/{id}/phases
pub async fn list_phases(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<ProjectPhase>>>> {
    load_visible_project(&state, &auth, id).await?;
    let phases = ProjectPhaseRepo::list_by_project(&state.pool, id).await?;
    Ok(Json(DataResponse { data: phases }))
}

/// POST /api/v1/projects/{id}/phases
///
/// Phases start `Not Started` and are appended after the last one unless a
/// `sort_order` is given.
pub async fn create_phase(
    State(state): State<AppState>,
    auth: AuthUser,
    client: ClientInfo,
    Path(id): Path<DbId>,
    Json(input): Json<CreatePhase>,
) -> AppResult<(StatusCode, Json<DataResponse<ProjectPhase>>)> {
    load_managed_project(&state, &auth, id).await?;
    validate(check_required_len("Phase name", &input.name, MAX_PROJECT_NAME_LEN))?;
    validate(check_max_len("Description", &input.description, MAX_PROJECT_DESCRIPTION_LEN))?;
    validate(check_date_range(input.start_date, input.end_date))?;
    validate(check_non_negative("Budget", input.budget))?;

    let phase = ProjectPhaseRepo::create(&state.pool, id, &input).await?;

    AuditEvent::new(entities::PROJECT_PHASE, phase.id, actions::CREATE)
        .by(auth.user_id)
        .client(&client)
        .after(&phase)
        .record(&state.pool)
        .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: phase })))
}

// ---------------------------------------------------------------------------
// Contractors
// ---------------------------------------------------------------------------

/// POST /api/v1/projects/{id}/contractors
///
/// Assign a contractor. Re-assigning a previously removed contractor
/// reactivates the existing row.
pub async fn assign_contractor(
    State(state): State<AppState>,
    auth: AuthUser,
    client: ClientInfo,
    Path(id): Path<DbId>,
    Json(input): Json<AssignContractor>,
) -> AppResult<(StatusCode, Json<DataResponse<ProjectContractor>>)> {
    load_managed_project(&state, &auth, id).await?;
    validate(check_non_negative("Hourly rate", input.hourly_rate))?;

    let contractor = UserRepo::find_by_id(&state.pool, input.contractor_id)
        .await?
        .ok_or_else(|| not_found("User", input.contractor_id))?;
    if contractor.role != ROLE_CONTRACTOR || !contractor.is_active {
        return Err(AppError::BadRequest(format!(
            "User {} is not an active contractor",
            contractor.id
        )));
    }

    let assignment = ProjectContractorRepo::assign(&state.pool, id, &input).await?;

    AuditEvent::new(entities::PROJECT_CONTRACTOR, assignment.id, actions::ASSIGN)
        .by(auth.user_id)
        .client(&client)
        .after(&assignment)
        .describe(format!("Contractor {} assigned to project {id}", contractor.id))
        .record(&state.pool)
        .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: assignment })))
}

/// DELETE /api/v1/projects/{id}/contractors/{contractor_id}
///
/// Ends the assignment; the row is kept with `unassigned_at` set.
pub async fn unassign_contractor(
    State(state): State<AppState>,
    auth: AuthUser,
    client: ClientInfo,
    Path((id, contractor_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    load_managed_project(&state, &auth, id).await?;
    if !ProjectContractorRepo::unassign(&state.pool, id, contractor_id).await? {
        return Err(not_found("ProjectContractor", contractor_id));
    }

    AuditEvent::new(entities::PROJECT, id, actions::ASSIGN)
        .by(auth.user_id)
        .client(&client)
        .describe(format!("Contractor {contractor_id} removed from project {id}"))
        .record(&state.pool)
        .await;

    Ok(StatusCode::NO_CONTENT)
}
