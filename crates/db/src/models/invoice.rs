//! Invoice, invoice line-item and payment models.

use buildwise_core::types::{DbId, Timestamp};
use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `invoices` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Invoice {
    pub id: DbId,
    pub invoice_number: String,
    pub title: String,
    pub description: String,
    pub status: String,
    pub sub_total: f64,
    pub tax_amount: f64,
    pub total_amount: f64,
    pub amount_paid: f64,
    pub balance_due: f64,
    pub quotation_id: Option<DbId>,
    pub project_id: Option<DbId>,
    pub maintenance_request_id: Option<DbId>,
    pub client_id: DbId,
    pub created_by_id: DbId,
    pub sent_at: Option<Timestamp>,
    pub due_date: NaiveDate,
    pub paid_at: Option<Timestamp>,
    pub payment_notes: Option<String>,
    pub payment_method: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting an invoice header. The number is assigned by the repo.
#[derive(Debug, Clone)]
pub struct CreateInvoice {
    pub title: String,
    pub description: String,
    pub sub_total: f64,
    pub tax_amount: f64,
    pub total_amount: f64,
    pub quotation_id: Option<DbId>,
    pub project_id: Option<DbId>,
    pub maintenance_request_id: Option<DbId>,
    pub client_id: DbId,
    pub created_by_id: DbId,
    pub due_date: NaiveDate,
}

/// A row from the `payments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Payment {
    pub id: DbId,
    pub invoice_id: DbId,
    pub amount: f64,
    pub payment_method: String,
    pub transaction_reference: Option<String>,
    pub notes: Option<String>,
    pub processed_by_id: DbId,
    pub processed_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreatePayment {
    pub invoice_id: DbId,
    pub amount: f64,
    pub payment_method: String,
    pub transaction_reference: Option<String>,
    pub notes: Option<String>,
    pub processed_by_id: DbId,
}
