//! Stored AI analysis results.

use buildwise_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `ai_analyses` table.
///
/// `analysis_result` holds the full completion text; the numeric columns are
/// whatever the extractors could scrape from it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AiAnalysis {
    pub id: DbId,
    pub analysis_type: String,
    pub title: String,
    pub analysis_result: String,
    pub recommendations: Option<String>,
    pub estimated_cost: Option<f64>,
    pub risk_score: Option<f64>,
    pub confidence_level: Option<String>,
    pub direct_costs: Option<f64>,
    pub indirect_costs: Option<f64>,
    pub contingency_amount: Option<f64>,
    pub materials_cost: Option<f64>,
    pub labor_cost: Option<f64>,
    pub equipment_cost: Option<f64>,
    pub project_duration_days: Option<i32>,
    pub schedule_risk: Option<f64>,
    pub budget_risk: Option<f64>,
    pub quality_risk: Option<f64>,
    pub safety_risk: Option<f64>,
    pub key_findings: serde_json::Value,
    pub risk_factors: serde_json::Value,
    pub cost_breakdown: serde_json::Value,
    pub project_id: Option<DbId>,
    pub maintenance_request_id: Option<DbId>,
    pub document_id: Option<DbId>,
    pub requested_by_id: DbId,
    pub created_at: Timestamp,
}

/// DTO for inserting an analysis. Unset figures stay NULL.
#[derive(Debug, Clone, Default)]
pub struct CreateAiAnalysis {
    pub analysis_type: String,
    pub title: String,
    pub analysis_result: String,
    pub recommendations: Option<String>,
    pub estimated_cost: Option<f64>,
    pub risk_score: Option<f64>,
    pub confidence_level: Option<String>,
    pub direct_costs: Option<f64>,
    pub indirect_costs: Option<f64>,
    pub contingency_amount: Option<f64>,
    pub materials_cost: Option<f64>,
    pub labor_cost: Option<f64>,
    pub equipment_cost: Option<f64>,
    pub project_duration_days: Option<i32>,
    pub schedule_risk: Option<f64>,
    pub budget_risk: Option<f64>,
    pub quality_risk: Option<f64>,
    pub safety_risk: Option<f64>,
    pub key_findings: serde_json::Value,
    pub risk_factors: serde_json::Value,
    pub cost_breakdown: serde_json::Value,
    pub project_id: Option<DbId>,
    pub maintenance_request_id: Option<DbId>,
    pub document_id: Option<DbId>,
    pub requested_by_id: DbId,
}
