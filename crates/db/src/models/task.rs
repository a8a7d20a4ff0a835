//! Task and task-update models.

use buildwise_core::types::{DbId, Timestamp};
use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `tasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Task {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub due_date: NaiveDate,
    pub status: String,
    pub priority: String,
    pub estimated_cost: f64,
    pub actual_cost: f64,
    pub project_phase_id: Option<DbId>,
    pub maintenance_request_id: Option<DbId>,
    pub assigned_to_id: DbId,
    pub created_by_id: DbId,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a task. Status always starts at `Pending`.
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub title: String,
    pub description: String,
    pub due_date: NaiveDate,
    pub priority: String,
    pub estimated_cost: f64,
    pub project_phase_id: Option<DbId>,
    pub maintenance_request_id: Option<DbId>,
    pub assigned_to_id: DbId,
    pub created_by_id: DbId,
}

/// A row from the `task_updates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TaskUpdate {
    pub id: DbId,
    pub task_id: DbId,
    pub updated_by_id: DbId,
    pub description: String,
    pub status_change: Option<String>,
    pub cost_update: Option<f64>,
    pub created_at: Timestamp,
}

/// History row written together with a task status change.
#[derive(Debug, Clone)]
pub struct CreateTaskUpdate {
    pub updated_by_id: DbId,
    pub description: String,
    pub status_change: Option<String>,
    pub cost_update: Option<f64>,
}

/// Status change applied to a task row.
#[derive(Debug, Clone)]
pub struct TaskStatusChange {
    pub status: String,
    pub actual_cost: Option<f64>,
    pub completed_at: Option<Timestamp>,
}
