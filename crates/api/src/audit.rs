//! Audit trail writer used by mutating handlers.
//!
//! Entries are written after the audited change has been committed. A failed
//! audit insert is logged and does not undo or fail the request.

use buildwise_core::audit::snapshot;
use buildwise_core::types::DbId;
use buildwise_db::models::audit::CreateAuditLog;
use buildwise_db::repositories::AuditLogRepo;
use buildwise_db::DbPool;
use serde::Serialize;

use crate::middleware::client::ClientInfo;

/// Builder for one `audit_logs` row.
///
/// ```ignore
/// AuditEvent::new(entities::PROJECT, project.id, actions::UPDATE)
///     .by(auth.user_id)
///     .client(&client)
///     .before(&old)
///     .after(&project)
///     .record(&state.pool)
///     .await;
/// ```
#[derive(Debug, Clone)]
pub struct AuditEvent {
    entry: CreateAuditLog,
}

impl AuditEvent {
    pub fn new(entity_type: &str, entity_id: DbId, action: &str) -> Self {
        Self {
            entry: CreateAuditLog {
                entity_type: entity_type.to_string(),
                entity_id,
                action: action.to_string(),
                user_id: None,
                old_values: None,
                new_values: None,
                description: None,
                ip_address: None,
                user_agent: None,
            },
        }
    }

    pub fn by(mut self, user_id: DbId) -> Self {
        self.entry.user_id = Some(user_id);
        self
    }

    pub fn client(mut self, client: &ClientInfo) -> Self {
        self.entry.ip_address = client.ip_address.clone();
        self.entry.user_agent = client.user_agent.clone();
        self
    }

    /// Redacted snapshot of the entity before the change.
    pub fn before<T: Serialize>(mut self, entity: &T) -> Self {
        self.entry.old_values = Some(snapshot(entity));
        self
    }

    /// Redacted snapshot of the entity after the change.
    pub fn after<T: Serialize>(mut self, entity: &T) -> Self {
        self.entry.new_values = Some(snapshot(entity));
        self
    }

    pub fn old_values(mut self, value: serde_json::Value) -> Self {
        self.entry.old_values = Some(value);
        self
    }

    pub fn new_values(mut self, value: serde_json::Value) -> Self {
        self.entry.new_values = Some(value);
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.entry.description = Some(description.into());
        self
    }

    /// Insert the row, logging instead of failing.
    pub async fn record(self, pool: &DbPool) {
        if let Err(e) = AuditLogRepo::insert(pool, &self.entry).await {
            tracing::error!(
                error = %e,
                entity_type = %self.entry.entity_type,
                entity_id = self.entry.entity_id,
                action = %self.entry.action,
                "Failed to write audit log"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use buildwise_core::audit::{actions, entities};
    use serde_json::json;

    use super::*;

    #[test]
    fn builder_fills_entry_and_redacts_snapshots() {
        let client = ClientInfo {
            ip_address: Some("10.1.1.1".into()),
            user_agent: Some("test-agent".into()),
        };
        let event = AuditEvent::new(entities::USER, 9, actions::UPDATE)
            .by(1)
            .client(&client)
            .before(&json!({ "email": "a@b.co", "password_hash": "$argon2id$..." }))
            .new_values(json!({ "status": "Active" }))
            .describe("Updated user");

        let e = &event.entry;
        assert_eq!(e.entity_type, "User");
        assert_eq!(e.entity_id, 9);
        assert_eq!(e.action, "Update");
        assert_eq!(e.user_id, Some(1));
        assert_eq!(e.ip_address.as_deref(), Some("10.1.1.1"));
        assert_eq!(e.user_agent.as_deref(), Some("test-agent"));
        let old = e.old_values.as_ref().unwrap();
        assert_eq!(old["email"], "a@b.co");
        assert_eq!(old["password_hash"], "[REDACTED]");
        assert_eq!(e.new_values.as_ref().unwrap()["status"], "Active");
        assert_eq!(e.description.as_deref(), Some("Updated user"));
    }
}
