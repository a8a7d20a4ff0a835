//! Repositories for `projects`, `project_phases` and `project_contractors`.

use buildwise_core::roles::{ROLE_ADMIN, ROLE_CLIENT, ROLE_CONTRACTOR, ROLE_PROJECT_MANAGER};
use buildwise_core::status::{CONTRACTOR_ACTIVE, CONTRACTOR_INACTIVE, PHASE_NOT_STARTED, PROJECT_PLANNING};
use buildwise_core::types::DbId;
use sqlx::PgPool;

use crate::models::project::{
    AssignContractor, CreatePhase, CreateProject, Project, ProjectContractor,
    ProjectContractorView, ProjectPhase, UpdateProject,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, location, start_date, end_date, budget, \
                       actual_cost, status, project_manager_id, client_id, created_at, updated_at";

const PHASE_COLUMNS: &str = "id, project_id, name, description, start_date, end_date, budget, \
                             actual_cost, status, sort_order, created_at, updated_at";

const CONTRACTOR_COLUMNS: &str = "id, project_id, contractor_id, specialization, hourly_rate, \
                                  status, assigned_at, unassigned_at, created_at, updated_at";

/// WHERE fragment restricting `projects` to what the viewer (`$1`) may see.
///
/// Every branch references `$1` so the bind list is the same for all roles.
pub(crate) fn visibility_clause(role: &str) -> &'static str {
    match role {
        ROLE_ADMIN => "$1::BIGINT IS NOT NULL",
        ROLE_PROJECT_MANAGER => "projects.project_manager_id = $1",
        ROLE_CLIENT => "projects.client_id = $1",
        ROLE_CONTRACTOR => {
            "EXISTS (SELECT 1 FROM project_contractors pc \
             WHERE pc.project_id = projects.id AND pc.contractor_id = $1 \
               AND pc.unassigned_at IS NULL)"
        }
        _ => "$1::BIGINT IS NULL",
    }
}

/// Provides CRUD operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project in `Planning`, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateProject) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects
                (name, description, location, start_date, end_date, budget, status,
                 project_manager_id, client_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.location)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.budget)
            .bind(PROJECT_PLANNING)
            .bind(input.project_manager_id)
            .bind(input.client_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Projects visible to the viewer, most recently created first.
    pub async fn list_for_viewer(
        pool: &PgPool,
        viewer_id: DbId,
        role: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects
             WHERE {}
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3",
            visibility_clause(role)
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(viewer_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Update a project. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                location = COALESCE($4, location),
                start_date = COALESCE($5, start_date),
                end_date = COALESCE($6, end_date),
                budget = COALESCE($7, budget),
                actual_cost = COALESCE($8, actual_cost),
                status = COALESCE($9, status),
                project_manager_id = COALESCE($10, project_manager_id),
                client_id = COALESCE($11, client_id)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.location)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.budget)
            .bind(input.actual_cost)
            .bind(&input.status)
            .bind(input.project_manager_id)
            .bind(input.client_id)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a project. Phases and assignments cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Provides operations for project phases.
pub struct ProjectPhaseRepo;

impl ProjectPhaseRepo {
    /// Insert a phase in `Not Started`. Without an explicit `sort_order` the
    /// phase is appended after the existing ones.
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        input: &CreatePhase,
    ) -> Result<ProjectPhase, sqlx::Error> {
        let query = format!(
            "INSERT INTO project_phases
                (project_id, name, description, start_date, end_date, budget, status, sort_order)
             VALUES ($1, $2, $3, $4, $5, $6, $7,
                     COALESCE($8, (SELECT COALESCE(MAX(sort_order), 0) + 1
                                   FROM project_phases WHERE project_id = $1)))
             RETURNING {PHASE_COLUMNS}"
        );
        sqlx::query_as::<_, ProjectPhase>(&query)
            .bind(project_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.budget)
            .bind(PHASE_NOT_STARTED)
            .bind(input.sort_order)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ProjectPhase>, sqlx::Error> {
        let query = format!("SELECT {PHASE_COLUMNS} FROM project_phases WHERE id = $1");
        sqlx::query_as::<_, ProjectPhase>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<ProjectPhase>, sqlx::Error> {
        let query = format!(
            "SELECT {PHASE_COLUMNS} FROM project_phases
             WHERE project_id = $1
             ORDER BY sort_order, id"
        );
        sqlx::query_as::<_, ProjectPhase>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    pub async fn count_by_project(pool: &PgPool, project_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM project_phases WHERE project_id = $1")
            .bind(project_id)
            .fetch_one(pool)
            .await
    }
}

/// Provides operations for contractor assignments.
pub struct ProjectContractorRepo;

impl ProjectContractorRepo {
    /// Assign a contractor, reactivating an earlier assignment if one exists.
    pub async fn assign(
        pool: &PgPool,
        project_id: DbId,
        input: &AssignContractor,
    ) -> Result<ProjectContractor, sqlx::Error> {
        let query = format!(
            "INSERT INTO project_contractors (project_id, contractor_id, specialization, hourly_rate, status)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (project_id, contractor_id) DO UPDATE SET
                specialization = EXCLUDED.specialization,
                hourly_rate = EXCLUDED.hourly_rate,
                status = EXCLUDED.status,
                assigned_at = NOW(),
                unassigned_at = NULL
             RETURNING {CONTRACTOR_COLUMNS}"
        );
        sqlx::query_as::<_, ProjectContractor>(&query)
            .bind(project_id)
            .bind(input.contractor_id)
            .bind(&input.specialization)
            .bind(input.hourly_rate)
            .bind(CONTRACTOR_ACTIVE)
            .fetch_one(pool)
            .await
    }

    /// Mark an assignment inactive. Returns `true` if an active one existed.
    pub async fn unassign(
        pool: &PgPool,
        project_id: DbId,
        contractor_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE project_contractors SET status = $3, unassigned_at = NOW()
             WHERE project_id = $1 AND contractor_id = $2 AND unassigned_at IS NULL",
        )
        .bind(project_id)
        .bind(contractor_id)
        .bind(CONTRACTOR_INACTIVE)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// IDs of contractors currently assigned to the project.
    pub async fn contractor_ids(pool: &PgPool, project_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT contractor_id FROM project_contractors
             WHERE project_id = $1 AND unassigned_at IS NULL",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    /// Current assignments with contractor names, for the detail view.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<ProjectContractorView>, sqlx::Error> {
        sqlx::query_as::<_, ProjectContractorView>(
            "SELECT pc.id, pc.contractor_id,
                    u.first_name || ' ' || u.last_name AS contractor_name,
                    u.email AS contractor_email,
                    pc.specialization, pc.hourly_rate, pc.status, pc.assigned_at
             FROM project_contractors pc
             JOIN users u ON u.id = pc.contractor_id
             WHERE pc.project_id = $1 AND pc.unassigned_at IS NULL
             ORDER BY pc.assigned_at",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }
}
