//! Status, priority and type vocabularies for every workflow entity.
//!
//! Statuses are plain strings persisted verbatim. Any known value may replace
//! any other; there is no transition table. The only side effect tied to a
//! value is that moving to `Completed` stamps `completed_at`.

// ---------------------------------------------------------------------------
// Shared values
// ---------------------------------------------------------------------------

pub const PENDING: &str = "Pending";
pub const IN_PROGRESS: &str = "In Progress";
pub const COMPLETED: &str = "Completed";
pub const CANCELLED: &str = "Cancelled";

// ---------------------------------------------------------------------------
// Projects and phases
// ---------------------------------------------------------------------------

pub const PROJECT_PLANNING: &str = "Planning";
pub const PROJECT_ON_HOLD: &str = "On Hold";

pub const PROJECT_STATUSES: &[&str] = &[
    PROJECT_PLANNING,
    IN_PROGRESS,
    COMPLETED,
    PROJECT_ON_HOLD,
    CANCELLED,
];

pub const PHASE_NOT_STARTED: &str = "Not Started";
pub const PHASE_DELAYED: &str = "Delayed";

pub const PHASE_STATUSES: &[&str] = &[PHASE_NOT_STARTED, IN_PROGRESS, COMPLETED, PHASE_DELAYED];

pub const CONTRACTOR_ACTIVE: &str = "Active";
pub const CONTRACTOR_INACTIVE: &str = "Inactive";
pub const CONTRACTOR_SUSPENDED: &str = "Suspended";

pub const CONTRACTOR_STATUSES: &[&str] =
    &[CONTRACTOR_ACTIVE, CONTRACTOR_INACTIVE, CONTRACTOR_SUSPENDED];

// ---------------------------------------------------------------------------
// Tasks and maintenance
// ---------------------------------------------------------------------------

pub const TASK_OVERDUE: &str = "Overdue";

pub const TASK_STATUSES: &[&str] = &[PENDING, IN_PROGRESS, COMPLETED, TASK_OVERDUE, CANCELLED];

pub const MAINTENANCE_STATUSES: &[&str] = &[PENDING, IN_PROGRESS, COMPLETED, CANCELLED];

pub const PRIORITY_LOW: &str = "Low";
pub const PRIORITY_MEDIUM: &str = "Medium";
pub const PRIORITY_HIGH: &str = "High";
pub const PRIORITY_CRITICAL: &str = "Critical";

pub const PRIORITIES: &[&str] = &[PRIORITY_LOW, PRIORITY_MEDIUM, PRIORITY_HIGH, PRIORITY_CRITICAL];

pub const PROPERTY_TYPES: &[&str] = &["Residential", "Commercial", "Industrial"];

// ---------------------------------------------------------------------------
// Documents, messages, notifications
// ---------------------------------------------------------------------------

pub const DOCUMENT_MAINTENANCE_ATTACHMENT: &str = "MaintenanceAttachment";

pub const DOCUMENT_TYPES: &[&str] = &[
    "Blueprint",
    "Contract",
    "Permit",
    "Report",
    "Invoice",
    "Photo",
    "Specification",
    "Other",
    DOCUMENT_MAINTENANCE_ATTACHMENT,
];

pub const ACCESS_VIEW: &str = "View";
pub const ACCESS_DOWNLOAD: &str = "Download";

pub const MESSAGE_GENERAL: &str = "General";

pub const MESSAGE_TYPES: &[&str] = &[MESSAGE_GENERAL, "Notification", "Alert", "Update"];

pub const NOTIFICATION_IN_APP: &str = "InApp";
pub const NOTIFICATION_SENT: &str = "Sent";
pub const NOTIFICATION_DELIVERED: &str = "Delivered";

pub const NOTIFICATION_TYPES: &[&str] = &["Email", "SMS", NOTIFICATION_IN_APP, "Push"];

pub const NOTIFICATION_STATUSES: &[&str] = &[PENDING, NOTIFICATION_SENT, NOTIFICATION_DELIVERED, "Failed"];

// ---------------------------------------------------------------------------
// Quotations, invoices, payments
// ---------------------------------------------------------------------------

pub const DRAFT: &str = "Draft";
pub const SENT: &str = "Sent";

pub const QUOTATION_ACCEPTED: &str = "Accepted";
pub const QUOTATION_REJECTED: &str = "Rejected";
pub const QUOTATION_EXPIRED: &str = "Expired";

pub const QUOTATION_STATUSES: &[&str] = &[
    DRAFT,
    SENT,
    QUOTATION_ACCEPTED,
    QUOTATION_REJECTED,
    QUOTATION_EXPIRED,
];

pub const INVOICE_PAID: &str = "Paid";
pub const INVOICE_OVERDUE: &str = "Overdue";

pub const INVOICE_STATUSES: &[&str] = &[DRAFT, SENT, INVOICE_PAID, INVOICE_OVERDUE, CANCELLED];

pub const PAYMENT_METHODS: &[&str] = &["EFT", "PayFast", "PayPal", "Cash", "Card"];

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check `value` against a vocabulary, naming the field in the error.
pub fn validate_one_of(field: &str, value: &str, allowed: &[&str]) -> Result<(), String> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(format!(
            "Invalid {field} '{value}'. Must be one of: {}",
            allowed.join(", ")
        ))
    }
}

pub fn validate_project_status(status: &str) -> Result<(), String> {
    validate_one_of("project status", status, PROJECT_STATUSES)
}

pub fn validate_phase_status(status: &str) -> Result<(), String> {
    validate_one_of("phase status", status, PHASE_STATUSES)
}

pub fn validate_task_status(status: &str) -> Result<(), String> {
    validate_one_of("task status", status, TASK_STATUSES)
}

pub fn validate_maintenance_status(status: &str) -> Result<(), String> {
    validate_one_of("maintenance status", status, MAINTENANCE_STATUSES)
}

pub fn validate_priority(priority: &str) -> Result<(), String> {
    validate_one_of("priority", priority, PRIORITIES)
}

pub fn validate_quotation_status(status: &str) -> Result<(), String> {
    validate_one_of("quotation status", status, QUOTATION_STATUSES)
}

pub fn validate_invoice_status(status: &str) -> Result<(), String> {
    validate_one_of("invoice status", status, INVOICE_STATUSES)
}

/// Human-readable record of a status move, stored on update rows.
pub fn status_change_label(old: &str, new: &str) -> String {
    format!("{old} → {new}")
}

pub fn is_completed(status: &str) -> bool {
    status == COMPLETED
}

/// High and Critical both count as high priority on dashboards and in
/// maintenance history summaries.
pub fn is_high_priority(priority: &str) -> bool {
    priority == PRIORITY_HIGH || priority == PRIORITY_CRITICAL
}
