//! Repository for `quotations` and `quotation_items`.

use buildwise_core::money::line_total;
use buildwise_core::roles::is_staff;
use buildwise_core::status;
use buildwise_core::types::DbId;
use sqlx::PgPool;

use crate::models::quotation::{CreateQuotation, LineItem, LineItemInput, Quotation};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, status, total_amount, tax_amount, grand_total, \
                       project_id, maintenance_request_id, client_id, created_by_id, sent_at, \
                       accepted_at, expires_at, notes, created_at, updated_at";

const ITEM_COLUMNS: &str = "id, description, quantity, unit_price, total_price, category, sort_order";

/// Staff see every quotation; anyone else only those addressed to them.
fn visibility_clause(role: &str) -> &'static str {
    if is_staff(role) {
        "$1::BIGINT IS NOT NULL"
    } else {
        "quotations.client_id = $1"
    }
}

/// Provides CRUD operations for quotations.
pub struct QuotationRepo;

impl QuotationRepo {
    /// Insert a `Draft` quotation and its line items in one transaction.
    pub async fn create(
        pool: &PgPool,
        input: &CreateQuotation,
        items: &[LineItemInput],
    ) -> Result<Quotation, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO quotations
                (title, description, status, total_amount, tax_amount, grand_total,
                 project_id, maintenance_request_id, client_id, created_by_id, expires_at, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {COLUMNS}"
        );
        let quotation = sqlx::query_as::<_, Quotation>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(status::DRAFT)
            .bind(input.total_amount)
            .bind(input.tax_amount)
            .bind(input.grand_total)
            .bind(input.project_id)
            .bind(input.maintenance_request_id)
            .bind(input.client_id)
            .bind(input.created_by_id)
            .bind(input.expires_at)
            .bind(&input.notes)
            .fetch_one(&mut *tx)
            .await?;

        for (i, item) in items.iter().enumerate() {
            sqlx::query(
                "INSERT INTO quotation_items
                    (quotation_id, description, quantity, unit_price, total_price, category, sort_order)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(quotation.id)
            .bind(&item.description)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(line_total(item.quantity, item.unit_price))
            .bind(&item.category)
            .bind(i as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(quotation)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Quotation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM quotations WHERE id = $1");
        sqlx::query_as::<_, Quotation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn items(pool: &PgPool, quotation_id: DbId) -> Result<Vec<LineItem>, sqlx::Error> {
        let query = format!(
            "SELECT {ITEM_COLUMNS} FROM quotation_items
             WHERE quotation_id = $1
             ORDER BY sort_order, id"
        );
        sqlx::query_as::<_, LineItem>(&query)
            .bind(quotation_id)
            .fetch_all(pool)
            .await
    }

    pub async fn list_for_viewer(
        pool: &PgPool,
        viewer_id: DbId,
        role: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Quotation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM quotations
             WHERE {}
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3",
            visibility_clause(role)
        );
        sqlx::query_as::<_, Quotation>(&query)
            .bind(viewer_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Set the status, stamping `sent_at` on `Sent` and `accepted_at` on
    /// `Accepted`. Earlier stamps are kept.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        new_status: &str,
    ) -> Result<Option<Quotation>, sqlx::Error> {
        let query = format!(
            "UPDATE quotations SET
                status = $2,
                sent_at = CASE WHEN $2 = $3 THEN COALESCE(sent_at, NOW()) ELSE sent_at END,
                accepted_at = CASE WHEN $2 = $4 THEN COALESCE(accepted_at, NOW()) ELSE accepted_at END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Quotation>(&query)
            .bind(id)
            .bind(new_status)
            .bind(status::SENT)
            .bind(status::QUOTATION_ACCEPTED)
            .fetch_optional(pool)
            .await
    }
}
