//! Repository for `invoices`, `invoice_items` and `payments`.

use buildwise_core::money::{apply_payment, invoice_number, line_total};
use buildwise_core::roles::is_staff;
use buildwise_core::status;
use buildwise_core::types::DbId;
use chrono::Utc;
use sqlx::PgPool;

use crate::models::invoice::{CreateInvoice, CreatePayment, Invoice, Payment};
use crate::models::quotation::{LineItem, LineItemInput};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, invoice_number, title, description, status, sub_total, tax_amount, \
                       total_amount, amount_paid, balance_due, quotation_id, project_id, \
                       maintenance_request_id, client_id, created_by_id, sent_at, due_date, \
                       paid_at, payment_notes, payment_method, created_at, updated_at";

const ITEM_COLUMNS: &str = "id, description, quantity, unit_price, total_price, category, sort_order";

const PAYMENT_COLUMNS: &str = "id, invoice_id, amount, payment_method, transaction_reference, \
                               notes, processed_by_id, processed_at";

/// Staff see every invoice; anyone else only those billed to them.
fn visibility_clause(role: &str) -> &'static str {
    if is_staff(role) {
        "$1::BIGINT IS NOT NULL"
    } else {
        "invoices.client_id = $1"
    }
}

/// Result of [`InvoiceRepo::record_payment`].
#[derive(Debug)]
pub enum PaymentOutcome {
    Recorded { invoice: Invoice, payment: Payment },
    /// The invoice is `Paid` or `Cancelled`; nothing was written.
    Closed { invoice_number: String, status: String },
    NotFound,
}

/// Provides CRUD operations for invoices and their payments.
pub struct InvoiceRepo;

impl InvoiceRepo {
    /// Insert a `Draft` invoice with a freshly numbered `INV-` reference and
    /// its line items in one transaction. The balance starts at the total.
    pub async fn create(
        pool: &PgPool,
        input: &CreateInvoice,
        items: &[LineItemInput],
    ) -> Result<Invoice, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let seq: i64 = sqlx::query_scalar("SELECT nextval('invoice_number_seq')")
            .fetch_one(&mut *tx)
            .await?;
        let number = invoice_number(Utc::now().date_naive(), seq);

        let query = format!(
            "INSERT INTO invoices
                (invoice_number, title, description, status, sub_total, tax_amount,
                 total_amount, amount_paid, balance_due, quotation_id, project_id,
                 maintenance_request_id, client_id, created_by_id, due_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7, 0, $7, $8, $9, $10, $11, $12, $13)
             RETURNING {COLUMNS}"
        );
        let invoice = sqlx::query_as::<_, Invoice>(&query)
            .bind(&number)
            .bind(&input.title)
            .bind(&input.description)
            .bind(status::DRAFT)
            .bind(input.sub_total)
            .bind(input.tax_amount)
            .bind(input.total_amount)
            .bind(input.quotation_id)
            .bind(input.project_id)
            .bind(input.maintenance_request_id)
            .bind(input.client_id)
            .bind(input.created_by_id)
            .bind(input.due_date)
            .fetch_one(&mut *tx)
            .await?;

        for (i, item) in items.iter().enumerate() {
            sqlx::query(
                "INSERT INTO invoice_items
                    (invoice_id, description, quantity, unit_price, total_price, category, sort_order)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(invoice.id)
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
        Ok(invoice)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Invoice>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM invoices WHERE id = $1");
        sqlx::query_as::<_, Invoice>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The invoice raised from a quotation, if any.
    pub async fn find_by_quotation(
        pool: &PgPool,
        quotation_id: DbId,
    ) -> Result<Option<Invoice>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM invoices WHERE quotation_id = $1 ORDER BY id LIMIT 1"
        );
        sqlx::query_as::<_, Invoice>(&query)
            .bind(quotation_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn items(pool: &PgPool, invoice_id: DbId) -> Result<Vec<LineItem>, sqlx::Error> {
        let query = format!(
            "SELECT {ITEM_COLUMNS} FROM invoice_items
             WHERE invoice_id = $1
             ORDER BY sort_order, id"
        );
        sqlx::query_as::<_, LineItem>(&query)
            .bind(invoice_id)
            .fetch_all(pool)
            .await
    }

    pub async fn payments(pool: &PgPool, invoice_id: DbId) -> Result<Vec<Payment>, sqlx::Error> {
        let query = format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments
             WHERE invoice_id = $1
             ORDER BY processed_at, id"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(invoice_id)
            .fetch_all(pool)
            .await
    }

    pub async fn list_for_viewer(
        pool: &PgPool,
        viewer_id: DbId,
        role: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Invoice>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM invoices
             WHERE {}
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3",
            visibility_clause(role)
        );
        sqlx::query_as::<_, Invoice>(&query)
            .bind(viewer_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Set the status, stamping `sent_at` on `Sent` and `paid_at` on `Paid`.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        new_status: &str,
    ) -> Result<Option<Invoice>, sqlx::Error> {
        let query = format!(
            "UPDATE invoices SET
                status = $2,
                sent_at = CASE WHEN $2 = $3 THEN COALESCE(sent_at, NOW()) ELSE sent_at END,
                paid_at = CASE WHEN $2 = $4 THEN COALESCE(paid_at, NOW()) ELSE paid_at END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Invoice>(&query)
            .bind(id)
            .bind(new_status)
            .bind(status::SENT)
            .bind(status::INVOICE_PAID)
            .fetch_optional(pool)
            .await
    }

    /// Record a payment and roll it into the invoice balance. The invoice row
    /// is locked for the duration so concurrent payments serialize, and the
    /// status is checked under that lock. An invoice whose balance reaches
    /// zero becomes `Paid`.
    pub async fn record_payment(
        pool: &PgPool,
        input: &CreatePayment,
    ) -> Result<PaymentOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let locked: Option<(String, String, f64, f64)> = sqlx::query_as(
            "SELECT invoice_number, status, total_amount, amount_paid
             FROM invoices WHERE id = $1 FOR UPDATE",
        )
        .bind(input.invoice_id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some((number, current_status, total, already_paid)) = locked else {
            return Ok(PaymentOutcome::NotFound);
        };
        if current_status == status::INVOICE_PAID || current_status == status::CANCELLED {
            return Ok(PaymentOutcome::Closed {
                invoice_number: number,
                status: current_status,
            });
        }

        let outcome = apply_payment(total, already_paid, input.amount);

        let query = format!(
            "INSERT INTO payments
                (invoice_id, amount, payment_method, transaction_reference, notes, processed_by_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {PAYMENT_COLUMNS}"
        );
        let payment = sqlx::query_as::<_, Payment>(&query)
            .bind(input.invoice_id)
            .bind(input.amount)
            .bind(&input.payment_method)
            .bind(&input.transaction_reference)
            .bind(&input.notes)
            .bind(input.processed_by_id)
            .fetch_one(&mut *tx)
            .await?;

        let query = format!(
            "UPDATE invoices SET
                amount_paid = $2,
                balance_due = $3,
                payment_method = $4,
                payment_notes = COALESCE($5, payment_notes),
                status = CASE WHEN $6 THEN $7 ELSE status END,
                paid_at = CASE WHEN $6 THEN COALESCE(paid_at, NOW()) ELSE paid_at END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let invoice = sqlx::query_as::<_, Invoice>(&query)
            .bind(input.invoice_id)
            .bind(outcome.amount_paid)
            .bind(outcome.balance_due)
            .bind(&input.payment_method)
            .bind(&input.notes)
            .bind(outcome.fully_paid)
            .bind(status::INVOICE_PAID)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(PaymentOutcome::Recorded { invoice, payment })
    }
}
