//! Audit trail constants and snapshot helpers.
//!
//! Mutating endpoints record an `audit_logs` row carrying JSON snapshots of
//! the entity before and after the change. Snapshots are produced here so
//! every caller applies the same redaction.

use serde::Serialize;

// ---------------------------------------------------------------------------
// Action constants
// ---------------------------------------------------------------------------

/// Known audit actions.
pub mod actions {
    pub const CREATE: &str = "Create";
    pub const UPDATE: &str = "Update";
    pub const DELETE: &str = "Delete";
    pub const STATUS_UPDATE: &str = "StatusUpdate";
    pub const UPLOAD: &str = "Upload";
    pub const READ: &str = "Read";
    pub const REPLY: &str = "Reply";
    pub const ASSIGN: &str = "Assign";
    pub const PAYMENT: &str = "Payment";
    pub const LOGIN: &str = "Login";
}

// ---------------------------------------------------------------------------
// Entity type constants
// ---------------------------------------------------------------------------

/// Entity names written to `audit_logs.entity_type`.
pub mod entities {
    pub const USER: &str = "User";
    pub const PROJECT: &str = "Project";
    pub const PROJECT_PHASE: &str = "ProjectPhase";
    pub const PROJECT_CONTRACTOR: &str = "ProjectContractor";
    pub const TASK: &str = "Task";
    pub const MAINTENANCE_REQUEST: &str = "MaintenanceRequest";
    pub const DOCUMENT: &str = "Document";
    pub const MESSAGE: &str = "Message";
    pub const QUOTATION: &str = "Quotation";
    pub const INVOICE: &str = "Invoice";
    pub const AI_ANALYSIS: &str = "AIAnalysis";
}

// ---------------------------------------------------------------------------
// Sensitive field redaction
// ---------------------------------------------------------------------------

/// Keys whose values never reach the audit table.
pub const SENSITIVE_FIELDS: &[&str] = &[
    "password",
    "token",
    "secret",
    "api_key",
    "authorization",
    "credential",
];

const REDACTED: &str = "[REDACTED]";

/// Replace the value of every key containing a [`SENSITIVE_FIELDS`] entry,
/// at any depth.
pub fn redact_sensitive_fields(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => serde_json::Value::Object(
            map.iter()
                .map(|(key, val)| {
                    let lower = key.to_lowercase();
                    let out = if SENSITIVE_FIELDS.iter().any(|f| lower.contains(f)) {
                        serde_json::Value::String(REDACTED.to_string())
                    } else {
                        redact_sensitive_fields(val)
                    };
                    (key.clone(), out)
                })
                .collect(),
        ),
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.iter().map(redact_sensitive_fields).collect())
        }
        other => other.clone(),
    }
}

/// Serialize an entity into a redacted audit snapshot.
///
/// Serialization failures collapse to `null` rather than blocking the
/// mutation that is being audited.
pub fn snapshot<T: Serialize>(entity: &T) -> serde_json::Value {
    serde_json::to_value(entity)
        .map(|v| redact_sensitive_fields(&v))
        .unwrap_or(serde_json::Value::Null)
}

/// Snapshot of a single status field, used for status-only updates.
pub fn status_snapshot(status: &str) -> serde_json::Value {
    serde_json::json!({ "status": status })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_secrets_are_redacted() {
        let input = json!({
            "email": "a@b.c",
            "password_hash": "$argon2id$...",
            "profile": { "api_key": "k", "phone": "082" },
            "sessions": [{ "refresh_token": "t" }]
        });
        let out = redact_sensitive_fields(&input);
        assert_eq!(out["email"], "a@b.c");
        assert_eq!(out["password_hash"], REDACTED);
        assert_eq!(out["profile"]["api_key"], REDACTED);
        assert_eq!(out["profile"]["phone"], "082");
        assert_eq!(out["sessions"][0]["refresh_token"], REDACTED);
    }

    #[test]
    fn snapshot_serializes_struct() {
        #[derive(Serialize)]
        struct Row {
            id: i64,
            name: &'static str,
        }
        let v = snapshot(&Row { id: 7, name: "Tower A" });
        assert_eq!(v, json!({ "id": 7, "name": "Tower A" }));
    }

    #[test]
    fn status_snapshot_shape() {
        assert_eq!(status_snapshot("Pending"), json!({ "status": "Pending" }));
    }
}
