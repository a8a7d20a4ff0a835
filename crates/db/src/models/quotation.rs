//! Quotation and quotation line-item models.

use buildwise_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `quotations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Quotation {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub status: String,
    pub total_amount: f64,
    pub tax_amount: f64,
    pub grand_total: f64,
    pub project_id: Option<DbId>,
    pub maintenance_request_id: Option<DbId>,
    pub client_id: DbId,
    pub created_by_id: DbId,
    pub sent_at: Option<Timestamp>,
    pub accepted_at: Option<Timestamp>,
    pub expires_at: Option<Timestamp>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A priced line shared by quotations and invoices.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LineItem {
    pub id: DbId,
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub total_price: f64,
    pub category: Option<String>,
    pub sort_order: i32,
}

/// Line item as submitted by the client of the API.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LineItemInput {
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub category: Option<String>,
}

/// DTO for inserting a quotation header; totals are computed by the caller.
#[derive(Debug, Clone)]
pub struct CreateQuotation {
    pub title: String,
    pub description: String,
    pub total_amount: f64,
    pub tax_amount: f64,
    pub grand_total: f64,
    pub project_id: Option<DbId>,
    pub maintenance_request_id: Option<DbId>,
    pub client_id: DbId,
    pub created_by_id: DbId,
    pub expires_at: Option<Timestamp>,
    pub notes: Option<String>,
}
