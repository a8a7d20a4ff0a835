//! Handlers for the `/quotations` resource and conversion of accepted
//! quotations into invoices.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use buildwise_core::access::{can_respond_to_quotation, can_view_financial};
use buildwise_core::audit::{actions, entities, status_snapshot};
use buildwise_core::error::CoreError;
use buildwise_core::money::{Totals, DEFAULT_TAX_RATE};
use buildwise_core::roles::ROLE_CLIENT;
use buildwise_core::status::{
    validate_quotation_status, QUOTATION_ACCEPTED, QUOTATION_REJECTED, SENT,
};
use buildwise_core::types::{DbId, Timestamp};
use buildwise_core::validation::{
    check_max_len, check_non_negative, check_positive, check_required_len, require_non_empty,
    MAX_TASK_DESCRIPTION_LEN, MAX_TITLE_LEN,
};
use buildwise_db::models::invoice::{CreateInvoice, Invoice};
use buildwise_db::models::notification::CreateNotification;
use buildwise_db::models::quotation::{CreateQuotation, LineItem, LineItemInput, Quotation};
use buildwise_db::repositories::{InvoiceRepo, QuotationRepo, UserRepo};
use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

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

/// Days until an invoice falls due when no date is given.
pub(crate) const DEFAULT_PAYMENT_TERMS_DAYS: i64 = 30;

/// Request body for `POST /quotations`.
#[derive(Debug, Deserialize)]
pub struct CreateQuotationRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub client_id: DbId,
    pub project_id: Option<DbId>,
    pub maintenance_request_id: Option<DbId>,
    pub expires_at: Option<Timestamp>,
    pub notes: Option<String>,
    /// Fraction, e.g. `0.15`. Defaults to VAT.
    pub tax_rate: Option<f64>,
    pub items: Vec<LineItemInput>,
}

/// Request body for the status endpoints of quotations and invoices.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

/// Request body for `POST /quotations/{id}/invoice`.
#[derive(Debug, Default, Deserialize)]
pub struct InvoiceFromQuotationRequest {
    pub due_date: Option<NaiveDate>,
}

/// Quotation with its line items.
#[derive(Debug, Serialize)]
pub struct QuotationDetail {
    #[serde(flatten)]
    pub quotation: Quotation,
    pub items: Vec<LineItem>,
}

// ---------------------------------------------------------------------------
// Shared finance helpers
// ---------------------------------------------------------------------------

/// Check the header fields and line items shared by quotations and invoices,
/// returning the computed totals.
pub(crate) fn validate_document(
    title: &str,
    description: &str,
    items: &[LineItemInput],
    tax_rate: Option<f64>,
) -> AppResult<Totals> {
    validate(check_required_len("Title", title, MAX_TITLE_LEN))?;
    validate(check_max_len("Description", description, MAX_TASK_DESCRIPTION_LEN))?;
    if items.is_empty() {
        return Err(AppError::BadRequest("At least one line item is required".into()));
    }
    for item in items {
        validate(require_non_empty("Item description", &item.description))?;
        validate(check_positive("Quantity", item.quantity))?;
        validate(check_non_negative("Unit price", item.unit_price))?;
    }
    let rate = tax_rate.unwrap_or(DEFAULT_TAX_RATE);
    validate(check_non_negative("Tax rate", rate))?;

    let lines: Vec<(f64, f64)> = items.iter().map(|i| (i.quantity, i.unit_price)).collect();
    Ok(Totals::compute(&lines, rate))
}

/// The addressee of a quotation or invoice must be an active client.
pub(crate) async fn require_client(state: &AppState, client_id: DbId) -> AppResult<()> {
    let client = UserRepo::find_by_id(&state.pool, client_id)
        .await?
        .ok_or_else(|| not_found("User", client_id))?;
    if client.role != ROLE_CLIENT || !client.is_active {
        return Err(AppError::BadRequest(format!(
            "User {client_id} is not an active client"
        )));
    }
    Ok(())
}

async fn load_visible_quotation(
    state: &AppState,
    auth: &AuthUser,
    id: DbId,
) -> AppResult<Quotation> {
    let quotation = QuotationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Quotation", id))?;
    if !can_view_financial(auth.viewer(), quotation.client_id) {
        return Err(forbidden("You do not have access to this quotation"));
    }
    Ok(quotation)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/quotations
///
/// Staff see every quotation; clients the ones addressed to them.
pub async fn list_quotations(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Quotation>>>> {
    let quotations = QuotationRepo::list_for_viewer(
        &state.pool,
        auth.user_id,
        &auth.role,
        params.limit(),
        params.offset(),
    )
    .await?;
    Ok(Json(DataResponse { data: quotations }))
}

/// POST /api/v1/quotations
///
/// Totals are computed from the line items; the quotation starts as `Draft`.
pub async fn create_quotation(
    State(state): State<AppState>,
    RequireStaff(auth): RequireStaff,
    client: ClientInfo,
    Json(input): Json<CreateQuotationRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<QuotationDetail>>)> {
    let totals = validate_document(&input.title, &input.description, &input.items, input.tax_rate)?;
    require_client(&state, input.client_id).await?;

    let quotation = QuotationRepo::create(
        &state.pool,
        &CreateQuotation {
            title: input.title.trim().to_string(),
            description: input.description,
            total_amount: totals.sub_total,
            tax_amount: totals.tax_amount,
            grand_total: totals.total,
            project_id: input.project_id,
            maintenance_request_id: input.maintenance_request_id,
            client_id: input.client_id,
            created_by_id: auth.user_id,
            expires_at: input.expires_at,
            notes: input.notes,
        },
        &input.items,
    )
    .await?;
    let items = QuotationRepo::items(&state.pool, quotation.id).await?;

    AuditEvent::new(entities::QUOTATION, quotation.id, actions::CREATE)
        .by(auth.user_id)
        .client(&client)
        .after(&quotation)
        .record(&state.pool)
        .await;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: QuotationDetail { quotation, items },
        }),
    ))
}

/// GET /api/v1/quotations/{id}
pub async fn get_quotation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<QuotationDetail>>> {
    let quotation = load_visible_quotation(&state, &auth, id).await?;
    let items = QuotationRepo::items(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: QuotationDetail { quotation, items },
    }))
}

/// POST /api/v1/quotations/{id}/status
///
/// Staff may set any status. The addressed client may only accept or reject
/// a quotation that has been sent. Sending notifies the client.
pub async fn update_quotation_status(
    State(state): State<AppState>,
    auth: AuthUser,
    client: ClientInfo,
    Path(id): Path<DbId>,
    Json(input): Json<StatusRequest>,
) -> AppResult<Json<DataResponse<Quotation>>> {
    validate(validate_quotation_status(&input.status))?;
    let before = load_visible_quotation(&state, &auth, id).await?;

    if !auth.viewer().is_staff() {
        if !can_respond_to_quotation(auth.viewer(), before.client_id) {
            return Err(forbidden("You cannot change this quotation"));
        }
        if input.status != QUOTATION_ACCEPTED && input.status != QUOTATION_REJECTED {
            return Err(forbidden("Clients may only accept or reject a quotation"));
        }
        if before.status != SENT {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "Only a sent quotation can be answered; this one is '{}'",
                before.status
            ))));
        }
    }

    let quotation = QuotationRepo::update_status(&state.pool, id, &input.status)
        .await?
        .ok_or_else(|| not_found("Quotation", id))?;

    if quotation.status == SENT && before.status != SENT {
        notify(
            &state.pool,
            CreateNotification::in_app(
                quotation.client_id,
                "New Quotation",
                format!("You have received a quotation: '{}'.", quotation.title),
            ),
        )
        .await;
    }

    AuditEvent::new(entities::QUOTATION, id, actions::STATUS_UPDATE)
        .by(auth.user_id)
        .client(&client)
        .old_values(status_snapshot(&before.status))
        .new_values(status_snapshot(&quotation.status))
        .record(&state.pool)
        .await;

    Ok(Json(DataResponse { data: quotation }))
}

/// POST /api/v1/quotations/{id}/invoice
///
/// Raise the invoice for an accepted quotation, copying its items and
/// totals. A quotation is invoiced at most once.
pub async fn create_invoice_from_quotation(
    State(state): State<AppState>,
    RequireStaff(auth): RequireStaff,
    client: ClientInfo,
    Path(id): Path<DbId>,
    Json(input): Json<InvoiceFromQuotationRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Invoice>>)> {
    let quotation = QuotationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Quotation", id))?;
    if quotation.status != QUOTATION_ACCEPTED {
        return Err(AppError::BadRequest(format!(
            "Only an accepted quotation can be invoiced; this one is '{}'",
            quotation.status
        )));
    }
    if let Some(existing) = InvoiceRepo::find_by_quotation(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Quotation {id} has already been invoiced as {}",
            existing.invoice_number
        ))));
    }

    let items: Vec<LineItemInput> = QuotationRepo::items(&state.pool, id)
        .await?
        .into_iter()
        .map(|item| LineItemInput {
            description: item.description,
            quantity: item.quantity,
            unit_price: item.unit_price,
            category: item.category,
        })
        .collect();

    let due_date = input
        .due_date
        .unwrap_or_else(|| Utc::now().date_naive() + Duration::days(DEFAULT_PAYMENT_TERMS_DAYS));
    let invoice = InvoiceRepo::create(
        &state.pool,
        &CreateInvoice {
            title: quotation.title.clone(),
            description: quotation.description.clone(),
            sub_total: quotation.total_amount,
            tax_amount: quotation.tax_amount,
            total_amount: quotation.grand_total,
            quotation_id: Some(quotation.id),
            project_id: quotation.project_id,
            maintenance_request_id: quotation.maintenance_request_id,
            client_id: quotation.client_id,
            created_by_id: auth.user_id,
            due_date,
        },
        &items,
    )
    .await?;
    tracing::info!(invoice_id = invoice.id, quotation_id = id, number = %invoice.invoice_number, "Invoice raised from quotation");

    AuditEvent::new(entities::INVOICE, invoice.id, actions::CREATE)
        .by(auth.user_id)
        .client(&client)
        .after(&invoice)
        .describe(format!("Raised from quotation {id}"))
        .record(&state.pool)
        .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: invoice })))
}
