//! Repository for the `ai_analyses` table.

use buildwise_core::roles::is_staff;
use buildwise_core::types::DbId;
use sqlx::PgPool;

use crate::models::analysis::{AiAnalysis, CreateAiAnalysis};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, analysis_type, title, analysis_result, recommendations, \
                       estimated_cost, risk_score, confidence_level, direct_costs, \
                       indirect_costs, contingency_amount, materials_cost, labor_cost, \
                       equipment_cost, project_duration_days, schedule_risk, budget_risk, \
                       quality_risk, safety_risk, key_findings, risk_factors, cost_breakdown, \
                       project_id, maintenance_request_id, document_id, requested_by_id, \
                       created_at";

/// Staff see every analysis; anyone else only their own requests.
fn visibility_clause(role: &str) -> &'static str {
    if is_staff(role) {
        "$1::BIGINT IS NOT NULL"
    } else {
        "ai_analyses.requested_by_id = $1"
    }
}

/// Provides insert and query operations for stored analyses.
pub struct AnalysisRepo;

impl AnalysisRepo {
    pub async fn create(pool: &PgPool, input: &CreateAiAnalysis) -> Result<AiAnalysis, sqlx::Error> {
        let query = format!(
            "INSERT INTO ai_analyses
                (analysis_type, title, analysis_result, recommendations, estimated_cost,
                 risk_score, confidence_level, direct_costs, indirect_costs,
                 contingency_amount, materials_cost, labor_cost, equipment_cost,
                 project_duration_days, schedule_risk, budget_risk, quality_risk,
                 safety_risk, key_findings, risk_factors, cost_breakdown, project_id,
                 maintenance_request_id, document_id, requested_by_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                     $16, $17, $18, $19, $20, $21, $22, $23, $24, $25)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AiAnalysis>(&query)
            .bind(&input.analysis_type)
            .bind(&input.title)
            .bind(&input.analysis_result)
            .bind(&input.recommendations)
            .bind(input.estimated_cost)
            .bind(input.risk_score)
            .bind(&input.confidence_level)
            .bind(input.direct_costs)
            .bind(input.indirect_costs)
            .bind(input.contingency_amount)
            .bind(input.materials_cost)
            .bind(input.labor_cost)
            .bind(input.equipment_cost)
            .bind(input.project_duration_days)
            .bind(input.schedule_risk)
            .bind(input.budget_risk)
            .bind(input.quality_risk)
            .bind(input.safety_risk)
            .bind(&input.key_findings)
            .bind(&input.risk_factors)
            .bind(&input.cost_breakdown)
            .bind(input.project_id)
            .bind(input.maintenance_request_id)
            .bind(input.document_id)
            .bind(input.requested_by_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<AiAnalysis>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM ai_analyses WHERE id = $1");
        sqlx::query_as::<_, AiAnalysis>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Analyses visible to the viewer, newest first, optionally of one type.
    pub async fn list_for_viewer(
        pool: &PgPool,
        viewer_id: DbId,
        role: &str,
        analysis_type: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AiAnalysis>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM ai_analyses
             WHERE {}
               AND ($4::TEXT IS NULL OR analysis_type = $4)
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3",
            visibility_clause(role)
        );
        sqlx::query_as::<_, AiAnalysis>(&query)
            .bind(viewer_id)
            .bind(limit)
            .bind(offset)
            .bind(analysis_type)
            .fetch_all(pool)
            .await
    }
}
