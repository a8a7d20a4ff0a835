//! Role-filtered aggregates for the dashboard.
//!
//! Every query reuses the list visibility clauses, so the dashboard never
//! counts a row the viewer could not open.

use buildwise_core::dashboard::{ACTIVE_PROJECT_STATUS, RECENT_ITEMS_LIMIT};
use buildwise_core::status;
use buildwise_core::types::DbId;
use chrono::NaiveDate;
use sqlx::PgPool;

use crate::models::dashboard::{DashboardCounts, ProjectBudgetRow, StatusCount};
use crate::models::maintenance::MaintenanceRequest;
use crate::models::project::Project;
use crate::models::task::Task;
use crate::repositories::{
    maintenance_repo, project_repo, task_repo, MaintenanceRepo, ProjectRepo, TaskRepo,
};

/// Provides read-only dashboard queries.
pub struct DashboardRepo;

impl DashboardRepo {
    /// Headline counts. Overdue means due before `today` and not completed.
    pub async fn counts(
        pool: &PgPool,
        viewer_id: DbId,
        role: &str,
        today: NaiveDate,
    ) -> Result<DashboardCounts, sqlx::Error> {
        let projects = project_repo::visibility_clause(role);
        let requests = maintenance_repo::visibility_clause(role);
        let tasks = task_repo::visibility_clause(role);
        let query = format!(
            "SELECT
                (SELECT COUNT(*) FROM projects WHERE {projects}) AS total_projects,
                (SELECT COUNT(*) FROM projects WHERE {projects} AND status = $2)
                    AS active_projects,
                (SELECT COUNT(*) FROM maintenance_requests WHERE {requests})
                    AS total_maintenance_requests,
                (SELECT COUNT(*) FROM maintenance_requests WHERE {requests} AND status = $3)
                    AS pending_maintenance_requests,
                (SELECT COUNT(*) FROM tasks WHERE {tasks}) AS total_tasks,
                (SELECT COUNT(*) FROM tasks WHERE {tasks} AND due_date < $4 AND status <> $5)
                    AS overdue_tasks,
                (SELECT COUNT(*) FROM messages WHERE recipient_id = $1 AND is_read = false)
                    AS unread_messages,
                (SELECT COUNT(*) FROM notifications WHERE recipient_id = $1 AND is_read = false)
                    AS unread_notifications"
        );
        sqlx::query_as::<_, DashboardCounts>(&query)
            .bind(viewer_id)
            .bind(ACTIVE_PROJECT_STATUS)
            .bind(status::PENDING)
            .bind(today)
            .bind(status::COMPLETED)
            .fetch_one(pool)
            .await
    }

    pub async fn recent_projects(
        pool: &PgPool,
        viewer_id: DbId,
        role: &str,
    ) -> Result<Vec<Project>, sqlx::Error> {
        ProjectRepo::list_for_viewer(pool, viewer_id, role, RECENT_ITEMS_LIMIT, 0).await
    }

    pub async fn recent_maintenance_requests(
        pool: &PgPool,
        viewer_id: DbId,
        role: &str,
    ) -> Result<Vec<MaintenanceRequest>, sqlx::Error> {
        MaintenanceRepo::list_for_viewer(pool, viewer_id, role, RECENT_ITEMS_LIMIT, 0).await
    }

    pub async fn recent_tasks(
        pool: &PgPool,
        viewer_id: DbId,
        role: &str,
    ) -> Result<Vec<Task>, sqlx::Error> {
        TaskRepo::list_for_viewer(pool, viewer_id, role, RECENT_ITEMS_LIMIT, 0).await
    }

    pub async fn project_status_counts(
        pool: &PgPool,
        viewer_id: DbId,
        role: &str,
    ) -> Result<Vec<StatusCount>, sqlx::Error> {
        let query = format!(
            "SELECT status AS label, COUNT(*) AS count FROM projects
             WHERE {}
             GROUP BY status ORDER BY status",
            project_repo::visibility_clause(role)
        );
        sqlx::query_as::<_, StatusCount>(&query)
            .bind(viewer_id)
            .fetch_all(pool)
            .await
    }

    pub async fn maintenance_priority_counts(
        pool: &PgPool,
        viewer_id: DbId,
        role: &str,
    ) -> Result<Vec<StatusCount>, sqlx::Error> {
        let query = format!(
            "SELECT priority AS label, COUNT(*) AS count FROM maintenance_requests
             WHERE {}
             GROUP BY priority ORDER BY priority",
            maintenance_repo::visibility_clause(role)
        );
        sqlx::query_as::<_, StatusCount>(&query)
            .bind(viewer_id)
            .fetch_all(pool)
            .await
    }

    pub async fn task_status_counts(
        pool: &PgPool,
        viewer_id: DbId,
        role: &str,
    ) -> Result<Vec<StatusCount>, sqlx::Error> {
        let query = format!(
            "SELECT status AS label, COUNT(*) AS count FROM tasks
             WHERE {}
             GROUP BY status ORDER BY status",
            task_repo::visibility_clause(role)
        );
        sqlx::query_as::<_, StatusCount>(&query)
            .bind(viewer_id)
            .fetch_all(pool)
            .await
    }

    /// Budget and spend for every visible project, oldest first.
    pub async fn project_budgets(
        pool: &PgPool,
        viewer_id: DbId,
        role: &str,
    ) -> Result<Vec<ProjectBudgetRow>, sqlx::Error> {
        let query = format!(
            "SELECT name, budget, actual_cost FROM projects
             WHERE {}
             ORDER BY created_at, id",
            project_repo::visibility_clause(role)
        );
        sqlx::query_as::<_, ProjectBudgetRow>(&query)
            .bind(viewer_id)
            .fetch_all(pool)
            .await
    }
}
