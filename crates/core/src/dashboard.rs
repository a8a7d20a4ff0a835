//! Dashboard summary rules.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::status::{COMPLETED, IN_PROGRESS};

/// How many recent projects, requests and tasks the dashboard lists.
pub const RECENT_ITEMS_LIMIT: i64 = 5;

/// Projects count as active only while `In Progress`.
pub const ACTIVE_PROJECT_STATUS: &str = IN_PROGRESS;

/// Past due and not completed. `Cancelled` tasks still count.
pub fn is_task_overdue(due_date: NaiveDate, status: &str, today: NaiveDate) -> bool {
    due_date < today && status != COMPLETED
}

/// Flatten `(name, budget, actual)` rows into the chart map keyed
/// `"<name> (Budget)"` / `"<name> (Actual)"`.
///
/// Projects sharing a name collapse onto the same keys; the later row wins.
pub fn budget_vs_actual<'a, I>(rows: I) -> BTreeMap<String, f64>
where
    I: IntoIterator<Item = (&'a str, f64, f64)>,
{
    let mut chart = BTreeMap::new();
    for (name, budget, actual) in rows {
        chart.insert(format!("{name} (Budget)"), budget);
        chart.insert(format!("{name} (Actual)"), actual);
    }
    chart
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn overdue_rules() {
        let today = d(2025, 6, 10);
        assert!(is_task_overdue(d(2025, 6, 9), "Pending", today));
        assert!(!is_task_overdue(d(2025, 6, 10), "Pending", today));
        assert!(!is_task_overdue(d(2025, 6, 1), COMPLETED, today));
    }

    #[test]
    fn chart_keys() {
        let chart = budget_vs_actual([("Clinic", 100.0, 80.0), ("School", 50.0, 60.0)]);
        assert_eq!(chart.len(), 4);
        assert_eq!(chart["Clinic (Budget)"], 100.0);
        assert_eq!(chart["School (Actual)"], 60.0);
    }
}
