//! Maintenance request models.

use buildwise_core::types::{DbId, Timestamp};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `maintenance_requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MaintenanceRequest {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub location: String,
    pub property_type: Option<String>,
    pub project_id: Option<DbId>,
    pub client_id: DbId,
    pub assigned_to_id: Option<DbId>,
    pub estimated_cost: Option<f64>,
    pub actual_cost: Option<f64>,
    pub due_date: Option<NaiveDate>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for a client-submitted request. Status always starts at `Pending`.
#[derive(Debug, Clone)]
pub struct CreateMaintenanceRequest {
    pub title: String,
    pub description: String,
    pub priority: String,
    pub location: String,
    pub property_type: Option<String>,
    pub project_id: Option<DbId>,
    pub client_id: DbId,
    pub due_date: Option<NaiveDate>,
}

/// Staff edit of a request. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMaintenanceRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub location: Option<String>,
    pub property_type: Option<String>,
    pub assigned_to_id: Option<DbId>,
    pub estimated_cost: Option<f64>,
    pub actual_cost: Option<f64>,
    pub due_date: Option<NaiveDate>,
}

/// A row from the `maintenance_updates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MaintenanceUpdate {
    pub id: DbId,
    pub maintenance_request_id: DbId,
    pub updated_by_id: DbId,
    pub description: String,
    pub status_change: Option<String>,
    pub created_at: Timestamp,
}

/// History row written together with a maintenance status change.
#[derive(Debug, Clone)]
pub struct CreateMaintenanceUpdate {
    pub updated_by_id: DbId,
    pub description: String,
    pub status_change: Option<String>,
}
