//! Message, attachment and conversation models.

use buildwise_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `messages` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Message {
    pub id: DbId,
    pub subject: String,
    pub content: String,
    pub sender_id: DbId,
    pub recipient_id: DbId,
    pub project_id: Option<DbId>,
    pub maintenance_request_id: Option<DbId>,
    pub task_id: Option<DbId>,
    pub message_type: String,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// A message joined with both participants' display names.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MessageView {
    pub id: DbId,
    pub subject: String,
    pub content: String,
    pub sender_id: DbId,
    pub sender_name: String,
    pub recipient_id: DbId,
    pub recipient_name: String,
    pub project_id: Option<DbId>,
    pub maintenance_request_id: Option<DbId>,
    pub task_id: Option<DbId>,
    pub message_type: String,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateMessage {
    pub subject: String,
    pub content: String,
    pub sender_id: DbId,
    pub recipient_id: DbId,
    pub project_id: Option<DbId>,
    pub maintenance_request_id: Option<DbId>,
    pub task_id: Option<DbId>,
    pub message_type: String,
}

/// A row from the `message_attachments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MessageAttachment {
    pub id: DbId,
    pub message_id: DbId,
    pub file_name: String,
    pub file_path: String,
    pub file_type: String,
    pub file_size: i64,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateMessageAttachment {
    pub message_id: DbId,
    pub file_name: String,
    pub file_path: String,
    pub file_type: String,
    pub file_size: i64,
}

/// One row of the conversation list: the other participant and the latest
/// message exchanged with them.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ConversationSummary {
    pub partner_id: DbId,
    pub partner_name: String,
    pub partner_role: String,
    pub last_message_id: DbId,
    pub last_subject: String,
    pub last_content: String,
    pub last_message_at: Timestamp,
    pub unread_count: i64,
}
