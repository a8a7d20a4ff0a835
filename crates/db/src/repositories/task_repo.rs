//! Repository for the `tasks` and `task_updates` tables.

use buildwise_core::roles::is_staff;
use buildwise_core::status::{COMPLETED, PENDING};
use buildwise_core::types::DbId;
use chrono::NaiveDate;
use sqlx::PgPool;

use crate::models::task::{CreateTask, CreateTaskUpdate, Task, TaskStatusChange, TaskUpdate};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, due_date, status, priority, estimated_cost, \
                       actual_cost, project_phase_id, maintenance_request_id, assigned_to_id, \
                       created_by_id, completed_at, created_at, updated_at";

const UPDATE_COLUMNS: &str =
    "id, task_id, updated_by_id, description, status_change, cost_update, created_at";

/// Staff see every task; everyone else sees what they created or were given.
pub(crate) fn visibility_clause(role: &str) -> &'static str {
    if is_staff(role) {
        "$1::BIGINT IS NOT NULL"
    } else {
        "(tasks.assigned_to_id = $1 OR tasks.created_by_id = $1)"
    }
}

/// Task counts for one project, reached through its phases.
#[derive(Debug, Clone, Copy, Default, sqlx::FromRow)]
pub struct ProjectTaskCounts {
    pub total: i64,
    pub completed: i64,
    pub overdue: i64,
}

/// Provides CRUD operations for tasks.
pub struct TaskRepo;

impl TaskRepo {
    /// Insert a task in `Pending`, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateTask) -> Result<Task, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks
                (title, description, due_date, status, priority, estimated_cost,
                 project_phase_id, maintenance_request_id, assigned_to_id, created_by_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.due_date)
            .bind(PENDING)
            .bind(&input.priority)
            .bind(input.estimated_cost)
            .bind(input.project_phase_id)
            .bind(input.maintenance_request_id)
            .bind(input.assigned_to_id)
            .bind(input.created_by_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Tasks visible to the viewer, newest first.
    pub async fn list_for_viewer(
        pool: &PgPool,
        viewer_id: DbId,
        role: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks
             WHERE {}
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3",
            visibility_clause(role)
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(viewer_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Tasks assigned to one contractor, soonest due first.
    pub async fn list_assigned_to(pool: &PgPool, user_id: DbId) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks WHERE assigned_to_id = $1 ORDER BY due_date, id"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    pub async fn list_by_maintenance_request(
        pool: &PgPool,
        maintenance_request_id: DbId,
    ) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks WHERE maintenance_request_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(maintenance_request_id)
            .fetch_all(pool)
            .await
    }

    /// Apply a status change and append its history row in one
    /// transaction. `actual_cost` and `completed_at` are only written when
    /// provided. Returns `None` (and writes nothing) for an unknown task.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        change: &TaskStatusChange,
        history: &CreateTaskUpdate,
    ) -> Result<Option<Task>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE tasks SET
                status = $2,
                actual_cost = COALESCE($3, actual_cost),
                completed_at = COALESCE($4, completed_at)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let Some(task) = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(&change.status)
            .bind(change.actual_cost)
            .bind(change.completed_at)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        sqlx::query(
            "INSERT INTO task_updates (task_id, updated_by_id, description, status_change, cost_update)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(id)
        .bind(history.updated_by_id)
        .bind(&history.description)
        .bind(&history.status_change)
        .bind(history.cost_update)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(task))
    }

    /// Update history for a task, newest first.
    pub async fn list_updates(pool: &PgPool, task_id: DbId) -> Result<Vec<TaskUpdate>, sqlx::Error> {
        let query = format!(
            "SELECT {UPDATE_COLUMNS} FROM task_updates WHERE task_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, TaskUpdate>(&query)
            .bind(task_id)
            .fetch_all(pool)
            .await
    }

    /// Totals for tasks whose phase belongs to the project. Overdue means
    /// due before `today` and not completed.
    pub async fn counts_for_project(
        pool: &PgPool,
        project_id: DbId,
        today: NaiveDate,
    ) -> Result<ProjectTaskCounts, sqlx::Error> {
        sqlx::query_as::<_, ProjectTaskCounts>(
            "SELECT COUNT(*) AS total,
                    COUNT(*) FILTER (WHERE t.status = $2) AS completed,
                    COUNT(*) FILTER (WHERE t.due_date < $3 AND t.status <> $2) AS overdue
             FROM tasks t
             JOIN project_phases ph ON ph.id = t.project_phase_id
             WHERE ph.project_id = $1",
        )
        .bind(project_id)
        .bind(COMPLETED)
        .bind(today)
        .fetch_one(pool)
        .await
    }
}
