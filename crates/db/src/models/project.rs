//! Project, phase and contractor-assignment models.

use buildwise_core::types::{deserialize_optional_id, DbId, Timestamp};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub budget: f64,
    pub actual_cost: f64,
    pub status: String,
    pub project_manager_id: Option<DbId>,
    pub client_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new project. Status always starts at `Planning`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProject {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub budget: f64,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub project_manager_id: Option<DbId>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub client_id: Option<DbId>,
}

/// DTO for updating an existing project. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub budget: Option<f64>,
    pub actual_cost: Option<f64>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub project_manager_id: Option<DbId>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub client_id: Option<DbId>,
}

/// A row from the `project_phases` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectPhase {
    pub id: DbId,
    pub project_id: DbId,
    pub name: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub budget: f64,
    pub actual_cost: f64,
    pub status: String,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePhase {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub budget: f64,
    pub sort_order: Option<i32>,
}

/// A row from the `project_contractors` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectContractor {
    pub id: DbId,
    pub project_id: DbId,
    pub contractor_id: DbId,
    pub specialization: Option<String>,
    pub hourly_rate: f64,
    pub status: String,
    pub assigned_at: Timestamp,
    pub unassigned_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Assignment joined with the contractor's name, for project detail pages.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectContractorView {
    pub id: DbId,
    pub contractor_id: DbId,
    pub contractor_name: String,
    pub contractor_email: String,
    pub specialization: Option<String>,
    pub hourly_rate: f64,
    pub status: String,
    pub assigned_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssignContractor {
    pub contractor_id: DbId,
    pub specialization: Option<String>,
    #[serde(default)]
    pub hourly_rate: f64,
}
