//! Handler for the role-filtered dashboard summary.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::Json;
use buildwise_core::dashboard::budget_vs_actual;
use buildwise_db::models::dashboard::{DashboardCounts, StatusCount};
use buildwise_db::models::maintenance::MaintenanceRequest;
use buildwise_db::models::project::Project;
use buildwise_db::models::task::Task;
use buildwise_db::repositories::DashboardRepo;
use chrono::Utc;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Everything the dashboard page renders in one payload.
#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    #[serde(flatten)]
    pub counts: DashboardCounts,
    pub recent_projects: Vec<Project>,
    pub recent_maintenance_requests: Vec<MaintenanceRequest>,
    pub recent_tasks: Vec<Task>,
    pub project_status_chart: BTreeMap<String, i64>,
    pub maintenance_priority_chart: BTreeMap<String, i64>,
    pub task_status_chart: BTreeMap<String, i64>,
    pub budget_vs_actual: BTreeMap<String, f64>,
}

fn chart(rows: Vec<StatusCount>) -> BTreeMap<String, i64> {
    rows.into_iter().map(|r| (r.label, r.count)).collect()
}

/// GET /api/v1/dashboard
///
/// Counts, recent items and chart series, each limited to what the caller
/// could open from the list endpoints.
pub async fn get_dashboard(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<DashboardSummary>>> {
    let pool = &state.pool;
    let (viewer, role) = (auth.user_id, auth.role.as_str());
    let today = Utc::now().date_naive();

    let (counts, recent_projects, recent_maintenance_requests, recent_tasks) = tokio::try_join!(
        DashboardRepo::counts(pool, viewer, role, today),
        DashboardRepo::recent_projects(pool, viewer, role),
        DashboardRepo::recent_maintenance_requests(pool, viewer, role),
        DashboardRepo::recent_tasks(pool, viewer, role),
    )?;
    let (project_statuses, maintenance_priorities, task_statuses, budgets) = tokio::try_join!(
        DashboardRepo::project_status_counts(pool, viewer, role),
        DashboardRepo::maintenance_priority_counts(pool, viewer, role),
        DashboardRepo::task_status_counts(pool, viewer, role),
        DashboardRepo::project_budgets(pool, viewer, role),
    )?;

    let budget_vs_actual = budget_vs_actual(
        budgets
            .iter()
            .map(|b| (b.name.as_str(), b.budget, b.actual_cost)),
    );

    Ok(Json(DataResponse {
        data: DashboardSummary {
            counts,
            recent_projects,
            recent_maintenance_requests,
            recent_tasks,
            project_status_chart: chart(project_statuses),
            maintenance_priority_chart: chart(maintenance_priorities),
            task_status_chart: chart(task_statuses),
            budget_vs_actual,
        },
    }))
}
