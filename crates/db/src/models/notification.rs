//! Notification entity models and DTOs.

use buildwise_core::status;
use buildwise_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub title: String,
    pub message: String,
    pub notification_type: String,
    pub recipient_id: DbId,
    pub status: String,
    pub project_id: Option<DbId>,
    pub maintenance_request_id: Option<DbId>,
    pub task_id: Option<DbId>,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub sent_at: Option<Timestamp>,
    pub delivered_at: Option<Timestamp>,
    pub error_message: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for queuing an in-app notification.
#[derive(Debug, Clone)]
pub struct CreateNotification {
    pub title: String,
    pub message: String,
    pub notification_type: String,
    pub recipient_id: DbId,
    pub status: String,
    pub project_id: Option<DbId>,
    pub maintenance_request_id: Option<DbId>,
    pub task_id: Option<DbId>,
}

impl CreateNotification {
    /// An in-app notification queued as `Pending`, with no linked records.
    pub fn in_app(recipient_id: DbId, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            notification_type: status::NOTIFICATION_IN_APP.to_string(),
            recipient_id,
            status: status::PENDING.to_string(),
            project_id: None,
            maintenance_request_id: None,
            task_id: None,
        }
    }

    pub fn for_project(mut self, project_id: DbId) -> Self {
        self.project_id = Some(project_id);
        self
    }

    pub fn for_maintenance_request(mut self, maintenance_request_id: DbId) -> Self {
        self.maintenance_request_id = Some(maintenance_request_id);
        self
    }

    pub fn for_task(mut self, task_id: DbId) -> Self {
        self.task_id = Some(task_id);
        self
    }
}
