//! Handlers for AI analyses: cost estimation, maintenance prediction and
//! project risk analysis, plus unsaved free-form assists.
//!
//! Each generating endpoint gathers context from the database, builds a
//! prompt, calls the completion provider once, scrapes figures out of the
//! reply and stores the whole result. Provider failures surface as 502.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use buildwise_core::access::can_view_analysis;
use buildwise_core::analysis::prompts::{
    cost_estimation_prompt, maintenance_prediction_prompt, risk_analysis_prompt,
};
use buildwise_core::analysis::{
    cost_estimation_title, high_risk_message, is_high_risk, maintenance_prediction_title,
    parse_cost_estimate, parse_maintenance_prediction, parse_risk_assessment, risk_analysis_title,
    MaintenanceHistory, ProjectContext, ProjectRiskData, ProjectRiskInputs, ANALYSIS_TYPES,
    HIGH_RISK_TITLE, TYPE_COST_ESTIMATION, TYPE_PREDICTIVE_MAINTENANCE, TYPE_RISK_ANALYSIS,
};
use buildwise_core::audit::{actions, entities};
use buildwise_core::status::validate_one_of;
use buildwise_core::types::DbId;
use buildwise_core::validation::require_non_empty;
use buildwise_db::models::analysis::{AiAnalysis, CreateAiAnalysis};
use buildwise_db::models::notification::CreateNotification;
use buildwise_db::repositories::{
    AnalysisRepo, DocumentRepo, MaintenanceRepo, ProjectPhaseRepo, TaskRepo,
};
use buildwise_llm::prompts as assist;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::projects::load_visible_project;
use super::{forbidden, not_found, validate};
use crate::audit::AuditEvent;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::client::ClientInfo;
use crate::middleware::rbac::RequireStaff;
use crate::notifications::notify;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /analyses`.
#[derive(Debug, Default, Deserialize)]
pub struct AnalysisListParams {
    pub analysis_type: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Request body for `POST /analyses/cost-estimation`.
#[derive(Debug, Deserialize)]
pub struct CostEstimationRequest {
    pub project_id: Option<DbId>,
    pub document_id: Option<DbId>,
    #[serde(default)]
    pub description: String,
}

/// Request body for `POST /analyses/maintenance-prediction`.
#[derive(Debug, Default, Deserialize)]
pub struct MaintenancePredictionRequest {
    pub project_id: Option<DbId>,
}

/// Request body for `POST /analyses/risk-analysis`.
#[derive(Debug, Deserialize)]
pub struct RiskAnalysisRequest {
    pub project_id: DbId,
}

/// What an assist request asks the model to do.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssistKind {
    Blueprint,
    CostBreakdown,
    MaintenanceIssues,
    ProjectDelays,
}

/// Request body for `POST /analyses/assist`.
#[derive(Debug, Deserialize)]
pub struct AssistRequest {
    pub kind: AssistKind,
    pub input: String,
    /// Extra context, used by blueprint reviews.
    #[serde(default)]
    pub context: String,
}

/// The raw completion for an assist request. Nothing is stored.
#[derive(Debug, Serialize)]
pub struct AssistResponse {
    pub kind: AssistKind,
    pub response: String,
}

fn to_json<T: Serialize>(value: &T) -> AppResult<serde_json::Value> {
    serde_json::to_value(value)
        .map_err(|e| AppError::InternalError(format!("Failed to serialize analysis data: {e}")))
}

async fn store(
    state: &AppState,
    auth: &AuthUser,
    client: &ClientInfo,
    input: CreateAiAnalysis,
) -> AppResult<AiAnalysis> {
    let analysis = AnalysisRepo::create(&state.pool, &input).await?;
    tracing::info!(
        analysis_id = analysis.id,
        analysis_type = %analysis.analysis_type,
        user_id = auth.user_id,
        "AI analysis stored"
    );
    AuditEvent::new(entities::AI_ANALYSIS, analysis.id, actions::CREATE)
        .by(auth.user_id)
        .client(client)
        .describe(analysis.title.clone())
        .record(&state.pool)
        .await;
    Ok(analysis)
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// GET /api/v1/analyses
///
/// Staff see every analysis; others only their own requests.
pub async fn list_analyses(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<AnalysisListParams>,
) -> AppResult<Json<DataResponse<Vec<AiAnalysis>>>> {
    if let Some(kind) = params.analysis_type.as_deref() {
        validate(validate_one_of("analysis type", kind, ANALYSIS_TYPES))?;
    }
    let page = PaginationParams {
        limit: params.limit,
        offset: params.offset,
    };
    let analyses = AnalysisRepo::list_for_viewer(
        &state.pool,
        auth.user_id,
        &auth.role,
        params.analysis_type.as_deref(),
        page.limit(),
        page.offset(),
    )
    .await?;
    Ok(Json(DataResponse { data: analyses }))
}

/// GET /api/v1/analyses/{id}
pub async fn get_analysis(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<AiAnalysis>>> {
    let analysis = AnalysisRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("AiAnalysis", id))?;
    if !can_view_analysis(auth.viewer(), analysis.requested_by_id) {
        return Err(forbidden("You do not have access to this analysis"));
    }
    Ok(Json(DataResponse { data: analysis }))
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// POST /api/v1/analyses/cost-estimation
///
/// Estimate from a project, an optional supporting document and a free-text
/// scope. Without a project the description is required.
pub async fn cost_estimation(
    State(state): State<AppState>,
    RequireStaff(auth): RequireStaff,
    client: ClientInfo,
    Json(input): Json<CostEstimationRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<AiAnalysis>>)> {
    if input.project_id.is_none() {
        validate(require_non_empty("Description", &input.description))?;
    }

    // 1. Gather context.
    let mut ctx = ProjectContext::default();
    if let Some(project_id) = input.project_id {
        let project = load_visible_project(&state, &auth, project_id).await?;
        ctx.phase_count = ProjectPhaseRepo::count_by_project(&state.pool, project_id).await?;
        ctx.project_name = Some(project.name);
        ctx.location = Some(project.location).filter(|l| !l.is_empty());
        ctx.budget = Some(project.budget);
        ctx.description = Some(project.description).filter(|d| !d.is_empty());
    }
    if let Some(document_id) = input.document_id {
        let document = DocumentRepo::find_by_id(&state.pool, document_id)
            .await?
            .ok_or_else(|| not_found("Document", document_id))?;
        ctx.document_name = Some(document.name);
        ctx.document_type = Some(document.document_type);
    }

    // 2. Ask the model.
    let prompt = cost_estimation_prompt(&ctx, &input.description);
    let response = state.llm.complete(&prompt, state.config.llm.max_tokens).await?;

    // 3. Scrape and store.
    let estimate = parse_cost_estimate(&response);
    let analysis = store(
        &state,
        &auth,
        &client,
        CreateAiAnalysis {
            analysis_type: TYPE_COST_ESTIMATION.to_string(),
            title: cost_estimation_title(ctx.project_name.as_deref()),
            recommendations: Some(estimate.recommendations.clone()),
            estimated_cost: Some(estimate.total_cost),
            confidence_level: Some(estimate.confidence_level.clone()),
            direct_costs: Some(estimate.direct_costs),
            indirect_costs: Some(estimate.indirect_costs),
            contingency_amount: Some(estimate.contingency_amount),
            materials_cost: Some(estimate.materials_cost),
            labor_cost: Some(estimate.labor_cost),
            equipment_cost: Some(estimate.equipment_cost),
            project_duration_days: Some(estimate.project_duration_days),
            key_findings: to_json(&estimate.key_findings)?,
            risk_factors: serde_json::Value::Array(Vec::new()),
            cost_breakdown: to_json(&estimate.cost_breakdown)?,
            project_id: input.project_id,
            document_id: input.document_id,
            requested_by_id: auth.user_id,
            analysis_result: response,
            ..Default::default()
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: analysis })))
}

/// POST /api/v1/analyses/maintenance-prediction
///
/// Predict upcoming maintenance from one project's request history, or the
/// whole portfolio's when no project is given.
pub async fn maintenance_prediction(
    State(state): State<AppState>,
    RequireStaff(auth): RequireStaff,
    client: ClientInfo,
    Json(input): Json<MaintenancePredictionRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<AiAnalysis>>)> {
    let project_name = match input.project_id {
        Some(project_id) => Some(load_visible_project(&state, &auth, project_id).await?.name),
        None => None,
    };
    let samples = MaintenanceRepo::history_samples(&state.pool, input.project_id).await?;
    let history = MaintenanceHistory::from_samples(project_name.as_deref(), &samples);

    let prompt = maintenance_prediction_prompt(&history);
    let response = state.llm.complete(&prompt, state.config.llm.max_tokens).await?;

    let prediction = parse_maintenance_prediction(&response);
    let analysis = store(
        &state,
        &auth,
        &client,
        CreateAiAnalysis {
            analysis_type: TYPE_PREDICTIVE_MAINTENANCE.to_string(),
            title: maintenance_prediction_title(project_name.as_deref()),
            recommendations: Some(prediction.recommendations.clone()),
            risk_score: Some(prediction.risk_score),
            confidence_level: Some(prediction.confidence_level.clone()),
            key_findings: to_json(&prediction.key_findings)?,
            risk_factors: to_json(&prediction.risk_factors)?,
            cost_breakdown: serde_json::Value::Object(Default::default()),
            project_id: input.project_id,
            requested_by_id: auth.user_id,
            analysis_result: response,
            ..Default::default()
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: analysis })))
}

/// POST /api/v1/analyses/risk-analysis
///
/// Assess one project's delivery risk. A score at or above the high-risk
/// threshold alerts the project's manager.
pub async fn risk_analysis(
    State(state): State<AppState>,
    RequireStaff(auth): RequireStaff,
    client: ClientInfo,
    Json(input): Json<RiskAnalysisRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<AiAnalysis>>)> {
    // 1. Gather the project's figures.
    let project = load_visible_project(&state, &auth, input.project_id).await?;
    let today = Utc::now().date_naive();
    let tasks = TaskRepo::counts_for_project(&state.pool, project.id, today).await?;
    let pending_maintenance = MaintenanceRepo::open_count_for_project(&state.pool, project.id).await?;
    let phase_count = ProjectPhaseRepo::count_by_project(&state.pool, project.id).await?;

    let data = ProjectRiskData::compute(
        ProjectRiskInputs {
            project_id: project.id,
            project_name: project.name.clone(),
            status: project.status.clone(),
            start_date: project.start_date,
            end_date: project.end_date,
            budget: project.budget,
            actual_cost: project.actual_cost,
            total_tasks: tasks.total,
            completed_tasks: tasks.completed,
            overdue_tasks: tasks.overdue,
            pending_maintenance,
            phase_count,
        },
        today,
    );

    // 2. Ask the model.
    let prompt = risk_analysis_prompt(&data);
    let response = state.llm.complete(&prompt, state.config.llm.max_tokens).await?;

    // 3. Scrape and store.
    let assessment = parse_risk_assessment(&response);
    let analysis = store(
        &state,
        &auth,
        &client,
        CreateAiAnalysis {
            analysis_type: TYPE_RISK_ANALYSIS.to_string(),
            title: risk_analysis_title(&project.name),
            recommendations: Some(assessment.recommendations.clone()),
            risk_score: Some(assessment.risk_score),
            confidence_level: Some(assessment.confidence_level.clone()),
            schedule_risk: Some(assessment.schedule_risk),
            budget_risk: Some(assessment.budget_risk),
            quality_risk: Some(assessment.quality_risk),
            safety_risk: Some(assessment.safety_risk),
            key_findings: to_json(&assessment.key_findings)?,
            risk_factors: to_json(&assessment.risk_factors)?,
            cost_breakdown: serde_json::Value::Object(Default::default()),
            project_id: Some(project.id),
            requested_by_id: auth.user_id,
            analysis_result: response,
            ..Default::default()
        },
    )
    .await?;

    // 4. Alert the manager on a high score.
    if is_high_risk(assessment.risk_score) {
        match project.project_manager_id {
            Some(manager_id) => {
                notify(
                    &state.pool,
                    CreateNotification::in_app(
                        manager_id,
                        HIGH_RISK_TITLE,
                        high_risk_message(&project.name, assessment.risk_score),
                    )
                    .for_project(project.id),
                )
                .await;
            }
            None => tracing::warn!(
                project_id = project.id,
                risk_score = assessment.risk_score,
                "High-risk project has no manager to alert"
            ),
        }
    }

    Ok((StatusCode::CREATED, Json(DataResponse { data: analysis })))
}

/// POST /api/v1/analyses/assist
///
/// Run one of the free-form prompts (blueprint review, cost breakdown,
/// maintenance issues, project delays) and return the raw reply.
pub async fn assist(
    State(state): State<AppState>,
    RequireStaff(auth): RequireStaff,
    Json(input): Json<AssistRequest>,
) -> AppResult<Json<DataResponse<AssistResponse>>> {
    validate(require_non_empty("Input", &input.input))?;
    tracing::debug!(user_id = auth.user_id, kind = ?input.kind, "AI assist requested");

    let provider = state.llm.as_ref();
    let response = match input.kind {
        AssistKind::Blueprint => {
            assist::analyze_blueprint(provider, &input.input, &input.context).await?
        }
        AssistKind::CostBreakdown => assist::generate_cost_breakdown(provider, &input.input).await?,
        AssistKind::MaintenanceIssues => {
            assist::predict_maintenance_issues(provider, &input.input).await?
        }
        AssistKind::ProjectDelays => assist::analyze_project_delays(provider, &input.input).await?,
    };

    Ok(Json(DataResponse {
        data: AssistResponse {
            kind: input.kind,
            response,
        },
    }))
}
