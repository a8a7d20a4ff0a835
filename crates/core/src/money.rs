//! Currency arithmetic for quotations, invoices and payments.
//!
//! Amounts are South African Rand held as `f64` and rounded to cents at each
//! persisted step so stored totals always equal the sum of stored lines.

use chrono::NaiveDate;
use serde::Serialize;

/// Default VAT rate applied when a quotation or invoice does not specify one.
pub const DEFAULT_TAX_RATE: f64 = 0.15;

/// Round half away from zero to two decimals.
pub fn round_currency(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

pub fn line_total(quantity: f64, unit_price: f64) -> f64 {
    round_currency(quantity * unit_price)
}

/// Computed header amounts for a document with line items.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Totals {
    pub sub_total: f64,
    pub tax_amount: f64,
    pub total: f64,
}

impl Totals {
    /// `lines` are `(quantity, unit_price)` pairs.
    pub fn compute(lines: &[(f64, f64)], tax_rate: f64) -> Self {
        let sub_total = round_currency(lines.iter().map(|&(q, p)| line_total(q, p)).sum());
        let tax_amount = round_currency(sub_total * tax_rate);
        Self {
            sub_total,
            tax_amount,
            total: round_currency(sub_total + tax_amount),
        }
    }
}

/// Outstanding balance, floored at zero.
pub fn balance_due(total: f64, amount_paid: f64) -> f64 {
    round_currency((total - amount_paid).max(0.0))
}

/// Result of applying one payment to an invoice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaymentOutcome {
    pub amount_paid: f64,
    pub balance_due: f64,
    pub fully_paid: bool,
}

pub fn apply_payment(total: f64, already_paid: f64, amount: f64) -> PaymentOutcome {
    let amount_paid = round_currency(already_paid + amount);
    let balance_due = balance_due(total, amount_paid);
    PaymentOutcome {
        amount_paid,
        balance_due,
        fully_paid: balance_due <= 0.0,
    }
}

/// `INV-20250301-00042` for sequence 42 issued on 2025-03-01.
pub fn invoice_number(issued_on: NaiveDate, sequence: i64) -> String {
    format!("INV-{}-{sequence:05}", issued_on.format("%Y%m%d"))
}
