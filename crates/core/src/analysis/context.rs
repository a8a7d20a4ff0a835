//! Inputs gathered from the database before a prompt is built.
//!
//! Repositories fill the raw rows; the derived figures (averages, progress,
//! schedule variance) are computed here so they can be tested without a
//! database.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::money::round_currency;
use crate::status::{COMPLETED, PRIORITY_CRITICAL, PRIORITY_HIGH};
use crate::types::{DbId, Timestamp};

pub const DEFAULT_LOCATION: &str = "South Africa";
pub const DEFAULT_DOCUMENT_NAME: &str = "No documentation provided";
pub const DEFAULT_DOCUMENT_TYPE: &str = "N/A";
pub const ALL_PROJECTS: &str = "All Projects";

const COMMON_ISSUES_LIMIT: usize = 5;
const RECENT_ACTIVITY_LIMIT: usize = 10;

/// Project facts quoted in a cost-estimation prompt. Every field is
/// optional: an estimate can be requested from a bare description.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectContext {
    pub project_name: Option<String>,
    pub location: Option<String>,
    pub budget: Option<f64>,
    pub description: Option<String>,
    pub phase_count: i64,
    pub document_name: Option<String>,
    pub document_type: Option<String>,
}

/// One maintenance request as seen by the history summary.
#[derive(Debug, Clone)]
pub struct MaintenanceSample {
    pub title: String,
    pub priority: String,
    pub status: String,
    pub created_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

/// Aggregated maintenance history, newest first in `recent_activity`.
#[derive(Debug, Clone, Serialize)]
pub struct MaintenanceHistory {
    pub project_name: String,
    pub total_requests: usize,
    pub completed_requests: usize,
    pub high_priority_requests: usize,
    /// `(title, occurrences)`, most frequent first.
    pub common_issues: Vec<(String, usize)>,
    pub average_resolution_days: f64,
    pub recent_activity: Vec<String>,
}

impl MaintenanceHistory {
    /// Summarise `samples`, which must be ordered newest first.
    pub fn from_samples(project_name: Option<&str>, samples: &[MaintenanceSample]) -> Self {
        let completed: Vec<&MaintenanceSample> =
            samples.iter().filter(|s| s.status == COMPLETED).collect();

        let high_priority_requests = samples
            .iter()
            .filter(|s| s.priority == PRIORITY_HIGH || s.priority == PRIORITY_CRITICAL)
            .count();

        // Count titles, keeping first-seen order so ties are stable.
        let mut order: Vec<&str> = Vec::new();
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for s in samples {
            let entry = counts.entry(s.title.as_str()).or_insert(0);
            if *entry == 0 {
                order.push(s.title.as_str());
            }
            *entry += 1;
        }
        let mut common_issues: Vec<(String, usize)> = order
            .into_iter()
            .map(|title| (title.to_string(), counts[title]))
            .collect();
        common_issues.sort_by(|a, b| b.1.cmp(&a.1));
        common_issues.truncate(COMMON_ISSUES_LIMIT);

        let resolution_days: Vec<f64> = completed
            .iter()
            .filter_map(|s| {
                s.completed_at
                    .map(|done| (done - s.created_at).num_seconds() as f64 / 86_400.0)
            })
            .collect();
        let average_resolution_days = if resolution_days.is_empty() {
            0.0
        } else {
            resolution_days.iter().sum::<f64>() / resolution_days.len() as f64
        };

        let recent_activity = samples
            .iter()
            .take(RECENT_ACTIVITY_LIMIT)
            .map(|s| {
                format!(
                    "- {} ({}): {} - {}",
                    s.title,
                    s.priority,
                    s.status,
                    s.created_at.format("%Y-%m-%d")
                )
            })
            .collect();

        Self {
            project_name: project_name.unwrap_or(ALL_PROJECTS).to_string(),
            total_requests: samples.len(),
            completed_requests: completed.len(),
            high_priority_requests,
            common_issues,
            average_resolution_days,
            recent_activity,
        }
    }

    /// Completed share as a percentage, zero when there are no requests.
    pub fn completion_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.completed_requests as f64 / self.total_requests as f64 * 100.0
        }
    }
}

/// Raw project figures loaded for a risk analysis.
#[derive(Debug, Clone)]
pub struct ProjectRiskInputs {
    pub project_id: DbId,
    pub project_name: String,
    pub status: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub budget: f64,
    pub actual_cost: f64,
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub overdue_tasks: i64,
    pub pending_maintenance: i64,
    pub phase_count: i64,
}

/// Risk inputs plus the derived schedule and budget figures.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectRiskData {
    pub project_id: DbId,
    pub project_name: String,
    pub status: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub budget: f64,
    pub actual_cost: f64,
    pub budget_variance: f64,
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub overdue_tasks: i64,
    pub pending_maintenance: i64,
    pub phase_count: i64,
    /// Elapsed share of the planned duration, 0-100+, two decimals.
    pub progress_percentage: f64,
    pub days_remaining: i64,
    pub is_behind_schedule: bool,
}

impl ProjectRiskData {
    pub fn compute(inputs: ProjectRiskInputs, today: NaiveDate) -> Self {
        let total_days = (inputs.end_date - inputs.start_date).num_days();
        let elapsed_days = (today - inputs.start_date).num_days();
        let progress_percentage = if total_days > 0 {
            round_currency(elapsed_days as f64 / total_days as f64 * 100.0)
        } else {
            0.0
        };
        let is_behind_schedule = today > inputs.end_date && inputs.status != COMPLETED;

        Self {
            budget_variance: round_currency(inputs.actual_cost - inputs.budget),
            days_remaining: (inputs.end_date - today).num_days(),
            progress_percentage,
            is_behind_schedule,
            project_id: inputs.project_id,
            project_name: inputs.project_name,
            status: inputs.status,
            start_date: inputs.start_date,
            end_date: inputs.end_date,
            budget: inputs.budget,
            actual_cost: inputs.actual_cost,
            total_tasks: inputs.total_tasks,
            completed_tasks: inputs.completed_tasks,
            overdue_tasks: inputs.overdue_tasks,
            pending_maintenance: inputs.pending_maintenance,
            phase_count: inputs.phase_count,
        }
    }

    /// Spent share of the budget, zero for an unbudgeted project.
    pub fn budget_utilization(&self) -> f64 {
        if self.budget > 0.0 {
            self.actual_cost / self.budget * 100.0
        } else {
            0.0
        }
    }

    /// Variance relative to the budget, zero for an unbudgeted project.
    pub fn budget_variance_percentage(&self) -> f64 {
        if self.budget > 0.0 {
            self.budget_variance / self.budget * 100.0
        } else {
            0.0
        }
    }

    pub fn task_completion_rate(&self) -> f64 {
        if self.total_tasks > 0 {
            self.completed_tasks as f64 / self.total_tasks as f64 * 100.0
        } else {
            0.0
        }
    }
}
