//! Row shapes for the dashboard aggregates.

use serde::Serialize;
use sqlx::FromRow;

/// `status -> count` (or `priority -> count`) for chart series.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StatusCount {
    pub label: String,
    pub count: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct ProjectBudgetRow {
    pub name: String,
    pub budget: f64,
    pub actual_cost: f64,
}

/// Headline counts, already filtered to what the viewer may see.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct DashboardCounts {
    pub total_projects: i64,
    pub active_projects: i64,
    pub total_maintenance_requests: i64,
    pub pending_maintenance_requests: i64,
    pub total_tasks: i64,
    pub overdue_tasks: i64,
    pub unread_messages: i64,
    pub unread_notifications: i64,
}
