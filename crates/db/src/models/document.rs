//! Document and document-access models.

use buildwise_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `documents` table. `file_path` is relative to the upload root.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Document {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub file_name: String,
    pub file_path: String,
    pub file_type: String,
    pub file_size: i64,
    pub document_type: String,
    pub project_id: Option<DbId>,
    pub task_id: Option<DbId>,
    pub maintenance_request_id: Option<DbId>,
    pub uploaded_by_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateDocument {
    pub name: String,
    pub description: String,
    pub file_name: String,
    pub file_path: String,
    pub file_type: String,
    pub file_size: i64,
    pub document_type: String,
    pub project_id: Option<DbId>,
    pub task_id: Option<DbId>,
    pub maintenance_request_id: Option<DbId>,
    pub uploaded_by_id: DbId,
}

/// A row from the `document_access_logs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DocumentAccess {
    pub id: DbId,
    pub document_id: DbId,
    pub accessed_by_id: DbId,
    pub access_type: String,
    pub ip_address: Option<String>,
    pub accessed_at: Timestamp,
}

/// Optional filters for the document list.
#[derive(Debug, Clone, Default)]
pub struct DocumentFilter {
    pub project_id: Option<DbId>,
    pub maintenance_request_id: Option<DbId>,
    pub document_type: Option<String>,
}
