//! Handlers for the `/invoices` resource and payments.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use buildwise_core::access::can_view_financial;
use buildwise_core::audit::{actions, entities, status_snapshot};
use buildwise_core::status::{
    validate_invoice_status, validate_one_of, PAYMENT_METHODS,
};
use buildwise_core::types::DbId;
use buildwise_core::validation::check_positive;
use buildwise_db::models::invoice::{CreateInvoice, CreatePayment, Invoice, Payment};
use buildwise_db::models::quotation::{LineItem, LineItemInput};
use buildwise_db::repositories::invoice_repo::PaymentOutcome;
use buildwise_db::repositories::InvoiceRepo;
use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::quotations::{require_client, validate_document, StatusRequest, DEFAULT_PAYMENT_TERMS_DAYS};
use super::{forbidden, not_found, validate};
use crate::audit::AuditEvent;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::client::ClientInfo;
use crate::middleware::rbac::RequireStaff;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /invoices`.
#[derive(Debug, Deserialize)]
pub struct CreateInvoiceRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub client_id: DbId,
    pub project_id: Option<DbId>,
    pub maintenance_request_id: Option<DbId>,
    pub due_date: Option<NaiveDate>,
    pub tax_rate: Option<f64>,
    pub items: Vec<LineItemInput>,
}

/// Request body for `POST /invoices/{id}/payments`.
#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    pub amount: f64,
    pub payment_method: String,
    pub transaction_reference: Option<String>,
    pub notes: Option<String>,
}

/// Invoice with its line items and payments.
#[derive(Debug, Serialize)]
pub struct InvoiceDetail {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub items: Vec<LineItem>,
    pub payments: Vec<Payment>,
}

/// The invoice after a payment, with the payment row.
#[derive(Debug, Serialize)]
pub struct PaymentReceipt {
    pub invoice: Invoice,
    pub payment: Payment,
}

/// GET /api/v1/invoices
///
/// Staff see every invoice; clients the ones addressed to them.
pub async fn list_invoices(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Invoice>>>> {
    let invoices = InvoiceRepo::list_for_viewer(
        &state.pool,
        auth.user_id,
        &auth.role,
        params.limit(),
        params.offset(),
    )
    .await?;
    Ok(Json(DataResponse { data: invoices }))
}

/// POST /api/v1/invoices
///
/// A standalone invoice. The number is assigned on insert.
pub async fn create_invoice(
    State(state): State<AppState>,
    RequireStaff(auth): RequireStaff,
    client: ClientInfo,
    Json(input): Json<CreateInvoiceRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<InvoiceDetail>>)> {
    let totals = validate_document(&input.title, &input.description, &input.items, input.tax_rate)?;
    require_client(&state, input.client_id).await?;

    let due_date = input
        .due_date
        .unwrap_or_else(|| Utc::now().date_naive() + Duration::days(DEFAULT_PAYMENT_TERMS_DAYS));
    let invoice = InvoiceRepo::create(
        &state.pool,
        &CreateInvoice {
            title: input.title.trim().to_string(),
            description: input.description,
            sub_total: totals.sub_total,
            tax_amount: totals.tax_amount,
            total_amount: totals.total,
            quotation_id: None,
            project_id: input.project_id,
            maintenance_request_id: input.maintenance_request_id,
            client_id: input.client_id,
            created_by_id: auth.user_id,
            due_date,
        },
        &input.items,
    )
    .await?;
    let items = InvoiceRepo::items(&state.pool, invoice.id).await?;

    AuditEvent::new(entities::INVOICE, invoice.id, actions::CREATE)
        .by(auth.user_id)
        .client(&client)
        .after(&invoice)
        .record(&state.pool)
        .await;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: InvoiceDetail {
                invoice,
                items,
                payments: Vec::new(),
            },
        }),
    ))
}

/// GET /api/v1/invoices/{id}
pub async fn get_invoice(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<InvoiceDetail>>> {
    let invoice = InvoiceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Invoice", id))?;
    if !can_view_financial(auth.viewer(), invoice.client_id) {
        return Err(forbidden("You do not have access to this invoice"));
    }
    let items = InvoiceRepo::items(&state.pool, id).await?;
    let payments = InvoiceRepo::payments(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: InvoiceDetail {
            invoice,
            items,
            payments,
        },
    }))
}

/// POST /api/v1/invoices/{id}/status
pub async fn update_invoice_status(
    State(state): State<AppState>,
    RequireStaff(auth): RequireStaff,
    client: ClientInfo,
    Path(id): Path<DbId>,
    Json(input): Json<StatusRequest>,
) -> AppResult<Json<DataResponse<Invoice>>> {
    validate(validate_invoice_status(&input.status))?;
    let before = InvoiceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Invoice", id))?;

    let invoice = InvoiceRepo::update_status(&state.pool, id, &input.status)
        .await?
        .ok_or_else(|| not_found("Invoice", id))?;

    AuditEvent::new(entities::INVOICE, id, actions::STATUS_UPDATE)
        .by(auth.user_id)
        .client(&client)
        .old_values(status_snapshot(&before.status))
        .new_values(status_snapshot(&invoice.status))
        .record(&state.pool)
        .await;

    Ok(Json(DataResponse { data: invoice }))
}

/// POST /api/v1/invoices/{id}/payments
///
/// Record a payment. The invoice becomes `Paid` once its balance reaches
/// zero; cancelled and settled invoices take no further payments.
pub async fn record_payment(
    State(state): State<AppState>,
    RequireStaff(auth): RequireStaff,
    client: ClientInfo,
    Path(id): Path<DbId>,
    Json(input): Json<PaymentRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<PaymentReceipt>>)> {
    validate(check_positive("Amount", input.amount))?;
    validate(validate_one_of("payment method", &input.payment_method, PAYMENT_METHODS))?;

    let before = InvoiceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Invoice", id))?;

    let outcome = InvoiceRepo::record_payment(
        &state.pool,
        &CreatePayment {
            invoice_id: id,
            amount: input.amount,
            payment_method: input.payment_method,
            transaction_reference: input.transaction_reference,
            notes: input.notes,
            processed_by_id: auth.user_id,
        },
    )
    .await?;
    let (invoice, payment) = match outcome {
        PaymentOutcome::Recorded { invoice, payment } => (invoice, payment),
        PaymentOutcome::Closed {
            invoice_number,
            status,
        } => {
            return Err(AppError::BadRequest(format!(
                "Invoice {invoice_number} is '{status}' and cannot take payments"
            )));
        }
        PaymentOutcome::NotFound => return Err(not_found("Invoice", id)),
    };
    tracing::info!(
        invoice_id = id,
        amount = payment.amount,
        balance_due = invoice.balance_due,
        "Payment recorded"
    );

    AuditEvent::new(entities::INVOICE, id, actions::PAYMENT)
        .by(auth.user_id)
        .client(&client)
        .before(&before)
        .after(&invoice)
        .describe(format!("Payment of {:.2} via {}", payment.amount, payment.payment_method))
        .record(&state.pool)
        .await;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: PaymentReceipt { invoice, payment },
        }),
    ))
}
