//! AI-assisted analysis: context gathering types, prompt templates and the
//! heuristics that scrape figures out of free-text completions.
//!
//! The completion text is stored verbatim; the extracted numbers are a
//! best-effort convenience for charts and listings, never authoritative.

pub mod context;
pub mod extract;
pub mod prompts;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use context::{MaintenanceHistory, MaintenanceSample, ProjectContext, ProjectRiskData, ProjectRiskInputs};

// ---------------------------------------------------------------------------
// Analysis kinds
// ---------------------------------------------------------------------------

pub const TYPE_COST_ESTIMATION: &str = "CostEstimation";
pub const TYPE_PREDICTIVE_MAINTENANCE: &str = "PredictiveMaintenance";
pub const TYPE_RISK_ANALYSIS: &str = "RiskAnalysis";

pub const ANALYSIS_TYPES: &[&str] = &[
    TYPE_COST_ESTIMATION,
    TYPE_PREDICTIVE_MAINTENANCE,
    TYPE_RISK_ANALYSIS,
];

/// Risk scores at or above this value notify the project's manager.
pub const HIGH_RISK_THRESHOLD: f64 = 70.0;

pub const HIGH_RISK_TITLE: &str = "High Risk Alert";

pub fn cost_estimation_title(project_name: Option<&str>) -> String {
    format!("Cost Estimation - {}", project_name.unwrap_or("General"))
}

pub fn maintenance_prediction_title(project_name: Option<&str>) -> String {
    format!("Maintenance Prediction - {}", project_name.unwrap_or("All Projects"))
}

pub fn risk_analysis_title(project_name: &str) -> String {
    format!("Risk Analysis - {project_name}")
}

pub fn is_high_risk(score: f64) -> bool {
    score >= HIGH_RISK_THRESHOLD
}

pub fn high_risk_message(project_name: &str, score: f64) -> String {
    format!(
        "Project '{project_name}' has been flagged with a high risk score of {score}. \
         Immediate attention required."
    )
}

// ---------------------------------------------------------------------------
// Parsed results
// ---------------------------------------------------------------------------

/// One risk pulled out of a completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskItem {
    pub category: String,
    pub description: String,
    pub score: f64,
    pub severity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mitigation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostEstimate {
    pub total_cost: f64,
    pub confidence_level: String,
    pub recommendations: String,
    pub direct_costs: f64,
    pub indirect_costs: f64,
    pub contingency_amount: f64,
    pub materials_cost: f64,
    pub labor_cost: f64,
    pub equipment_cost: f64,
    pub project_duration_days: i32,
    pub key_findings: Vec<String>,
    pub cost_breakdown: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaintenancePrediction {
    pub risk_score: f64,
    pub confidence_level: String,
    pub recommendations: String,
    pub key_findings: Vec<String>,
    pub risk_factors: Vec<RiskItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub risk_score: f64,
    pub confidence_level: String,
    pub recommendations: String,
    pub schedule_risk: f64,
    pub budget_risk: f64,
    pub quality_risk: f64,
    pub safety_risk: f64,
    pub risk_factors: Vec<RiskItem>,
    pub key_findings: Vec<String>,
}

pub fn parse_cost_estimate(text: &str) -> CostEstimate {
    CostEstimate {
        total_cost: extract::total_cost(text),
        confidence_level: extract::confidence_level(text),
        recommendations: extract::recommendations(text),
        direct_costs: extract::cost_component(text, "Direct Costs"),
        indirect_costs: extract::cost_component(text, "Indirect Costs"),
        contingency_amount: extract::cost_component(text, "Contingency"),
        materials_cost: extract::cost_component(text, "Materials"),
        labor_cost: extract::cost_component(text, "Labour"),
        equipment_cost: extract::cost_component(text, "Equipment"),
        project_duration_days: extract::project_duration_days(text),
        key_findings: extract::key_findings(text),
        cost_breakdown: extract::cost_breakdown(text),
    }
}

pub fn parse_maintenance_prediction(text: &str) -> MaintenancePrediction {
    MaintenancePrediction {
        risk_score: extract::risk_score(text),
        confidence_level: extract::confidence_level(text),
        recommendations: extract::recommendations(text),
        key_findings: extract::key_findings(text),
        risk_factors: extract::maintenance_risk_factors(text),
    }
}

pub fn parse_risk_assessment(text: &str) -> RiskAssessment {
    RiskAssessment {
        risk_score: extract::risk_score(text),
        confidence_level: extract::confidence_level(text),
        recommendations: extract::recommendations(text),
        schedule_risk: extract::category_risk(text, &["Schedule Risk"]),
        budget_risk: extract::category_risk(text, &["Financial Risk", "Budget Risk"]),
        quality_risk: extract::category_risk(text, &["Quality Risk"]),
        safety_risk: extract::category_risk(text, &["Safety Risk"]),
        risk_factors: extract::risk_factors(text),
        key_findings: extract::key_findings(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RISK_REPORT: &str = "\
EXECUTIVE RISK SUMMARY
- Overall Project Risk Score: 78 out of 100
- Project is running 12% over budget with 4 overdue tasks

TOP 5 CRITICAL RISKS:
a) Cost overrun on structural steel - Risk Score: 72
b) Schedule delay from late municipal approvals - Score: 55
c) Safety incidents during roof works - Score: 35

Schedule Risk: elevated at 65%
Budget Risk: 80/100
Quality Risk: moderate, 40 score
Safety Risk: 30%

Confidence Level: Medium

Recommendations: Re-baseline the programme and release contingency for steel.
";

    #[test]
    fn risk_report_parses_into_assessment() {
        let r = parse_risk_assessment(RISK_REPORT);
        assert_eq!(r.risk_score, 78.0);
        assert_eq!(r.confidence_level, "Medium");
        assert_eq!(r.schedule_risk, 65.0);
        assert_eq!(r.budget_risk, 80.0);
        assert_eq!(r.quality_risk, 40.0);
        assert_eq!(r.safety_risk, 30.0);
        assert_eq!(r.risk_factors.len(), 3);
        assert_eq!(r.risk_factors[0].category, "Financial");
        assert_eq!(r.risk_factors[0].severity, "Critical");
        assert_eq!(r.risk_factors[1].category, "Schedule");
        assert_eq!(r.risk_factors[1].severity, "High");
        assert_eq!(r.risk_factors[2].category, "Safety");
        assert_eq!(r.risk_factors[2].severity, "Medium");
        assert!(r.recommendations.starts_with("Re-baseline the programme"));
        assert!(is_high_risk(r.risk_score));
    }

    #[test]
    fn titles_fall_back_to_defaults() {
        assert_eq!(cost_estimation_title(None), "Cost Estimation - General");
        assert_eq!(cost_estimation_title(Some("Clinic")), "Cost Estimation - Clinic");
        assert_eq!(
            maintenance_prediction_title(None),
            "Maintenance Prediction - All Projects"
        );
        assert_eq!(risk_analysis_title("Clinic"), "Risk Analysis - Clinic");
    }

    #[test]
    fn high_risk_boundary() {
        assert!(is_high_risk(70.0));
        assert!(!is_high_risk(69.9));
        assert_eq!(
            high_risk_message("Clinic", 85.0),
            "Project 'Clinic' has been flagged with a high risk score of 85. Immediate attention required."
        );
    }
}
