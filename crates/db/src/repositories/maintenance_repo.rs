//! Repository for `maintenance_requests` and `maintenance_updates`.

use buildwise_core::analysis::MaintenanceSample;
use buildwise_core::roles::is_staff;
use buildwise_core::status::{IN_PROGRESS, PENDING};
use buildwise_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::maintenance::{
    CreateMaintenanceRequest, CreateMaintenanceUpdate, MaintenanceRequest, MaintenanceUpdate,
    UpdateMaintenanceRequest,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, status, priority, location, property_type, \
                       project_id, client_id, assigned_to_id, estimated_cost, actual_cost, \
                       due_date, completed_at, created_at, updated_at";

const UPDATE_COLUMNS: &str =
    "id, maintenance_request_id, updated_by_id, description, status_change, created_at";

/// Staff see every request; clients their own; contractors what they are assigned.
pub(crate) fn visibility_clause(role: &str) -> &'static str {
    if is_staff(role) {
        "$1::BIGINT IS NOT NULL"
    } else {
        "(maintenance_requests.client_id = $1 OR maintenance_requests.assigned_to_id = $1)"
    }
}

#[derive(sqlx::FromRow)]
struct SampleRow {
    title: String,
    priority: String,
    status: String,
    created_at: Timestamp,
    completed_at: Option<Timestamp>,
}

/// Provides CRUD operations for maintenance requests.
pub struct MaintenanceRepo;

impl MaintenanceRepo {
    /// Insert a request in `Pending`, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateMaintenanceRequest,
    ) -> Result<MaintenanceRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO maintenance_requests
                (title, description, status, priority, location, property_type,
                 project_id, client_id, due_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MaintenanceRequest>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(PENDING)
            .bind(&input.priority)
            .bind(&input.location)
            .bind(&input.property_type)
            .bind(input.project_id)
            .bind(input.client_id)
            .bind(input.due_date)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<MaintenanceRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM maintenance_requests WHERE id = $1");
        sqlx::query_as::<_, MaintenanceRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Requests visible to the viewer, newest first.
    pub async fn list_for_viewer(
        pool: &PgPool,
        viewer_id: DbId,
        role: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MaintenanceRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM maintenance_requests
             WHERE {}
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3",
            visibility_clause(role)
        );
        sqlx::query_as::<_, MaintenanceRequest>(&query)
            .bind(viewer_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Requests submitted by one client, newest first.
    pub async fn list_for_client(
        pool: &PgPool,
        client_id: DbId,
    ) -> Result<Vec<MaintenanceRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM maintenance_requests WHERE client_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, MaintenanceRequest>(&query)
            .bind(client_id)
            .fetch_all(pool)
            .await
    }

    /// Update a request. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateMaintenanceRequest,
    ) -> Result<Option<MaintenanceRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE maintenance_requests SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                priority = COALESCE($4, priority),
                location = COALESCE($5, location),
                property_type = COALESCE($6, property_type),
                assigned_to_id = COALESCE($7, assigned_to_id),
                estimated_cost = COALESCE($8, estimated_cost),
                actual_cost = COALESCE($9, actual_cost),
                due_date = COALESCE($10, due_date)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MaintenanceRequest>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.priority)
            .bind(&input.location)
            .bind(&input.property_type)
            .bind(input.assigned_to_id)
            .bind(input.estimated_cost)
            .bind(input.actual_cost)
            .bind(input.due_date)
            .fetch_optional(pool)
            .await
    }

    /// Set the status and append its history row in one transaction;
    /// `completed_at` is only written when provided.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
        completed_at: Option<Timestamp>,
        history: &CreateMaintenanceUpdate,
    ) -> Result<Option<MaintenanceRequest>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE maintenance_requests SET
                status = $2,
                completed_at = COALESCE($3, completed_at)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let Some(request) = sqlx::query_as::<_, MaintenanceRequest>(&query)
            .bind(id)
            .bind(status)
            .bind(completed_at)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        sqlx::query(
            "INSERT INTO maintenance_updates (maintenance_request_id, updated_by_id, description, status_change)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(id)
        .bind(history.updated_by_id)
        .bind(&history.description)
        .bind(&history.status_change)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(request))
    }

    pub async fn list_updates(
        pool: &PgPool,
        maintenance_request_id: DbId,
    ) -> Result<Vec<MaintenanceUpdate>, sqlx::Error> {
        let query = format!(
            "SELECT {UPDATE_COLUMNS} FROM maintenance_updates
             WHERE maintenance_request_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, MaintenanceUpdate>(&query)
            .bind(maintenance_request_id)
            .fetch_all(pool)
            .await
    }

    /// History samples, newest first, for one project or the whole portfolio.
    pub async fn history_samples(
        pool: &PgPool,
        project_id: Option<DbId>,
    ) -> Result<Vec<MaintenanceSample>, sqlx::Error> {
        let rows = sqlx::query_as::<_, SampleRow>(
            "SELECT title, priority, status, created_at, completed_at
             FROM maintenance_requests
             WHERE $1::BIGINT IS NULL OR project_id = $1
             ORDER BY created_at DESC, id DESC",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| MaintenanceSample {
                title: r.title,
                priority: r.priority,
                status: r.status,
                created_at: r.created_at,
                completed_at: r.completed_at,
            })
            .collect())
    }

    /// Requests on the project still `Pending` or `In Progress`.
    pub async fn open_count_for_project(pool: &PgPool, project_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM maintenance_requests
             WHERE project_id = $1 AND status IN ($2, $3)",
        )
        .bind(project_id)
        .bind(PENDING)
        .bind(IN_PROGRESS)
        .fetch_one(pool)
        .await
    }
}
