//! Repository for `documents` and `document_access_logs`.

use buildwise_core::roles::is_staff;
use buildwise_core::types::DbId;
use sqlx::PgPool;

use crate::models::document::{CreateDocument, Document, DocumentAccess, DocumentFilter};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, file_name, file_path, file_type, file_size, \
                       document_type, project_id, task_id, maintenance_request_id, \
                       uploaded_by_id, created_at, updated_at";

const ACCESS_COLUMNS: &str = "id, document_id, accessed_by_id, access_type, ip_address, accessed_at";

/// Staff see every document; others see their uploads and documents linked
/// to a project, task or request they are a party to.
fn visibility_clause(role: &str) -> &'static str {
    if is_staff(role) {
        "$1::BIGINT IS NOT NULL"
    } else {
        "(documents.uploaded_by_id = $1
          OR EXISTS (SELECT 1 FROM projects p WHERE p.id = documents.project_id
                       AND (p.client_id = $1 OR p.project_manager_id = $1))
          OR EXISTS (SELECT 1 FROM tasks t WHERE t.id = documents.task_id
                       AND (t.assigned_to_id = $1 OR t.created_by_id = $1))
          OR EXISTS (SELECT 1 FROM maintenance_requests m WHERE m.id = documents.maintenance_request_id
                       AND (m.client_id = $1 OR m.assigned_to_id = $1)))"
    }
}

/// Provides CRUD operations for documents.
pub struct DocumentRepo;

impl DocumentRepo {
    pub async fn create(pool: &PgPool, input: &CreateDocument) -> Result<Document, sqlx::Error> {
        let query = format!(
            "INSERT INTO documents
                (name, description, file_name, file_path, file_type, file_size, document_type,
                 project_id, task_id, maintenance_request_id, uploaded_by_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.file_name)
            .bind(&input.file_path)
            .bind(&input.file_type)
            .bind(input.file_size)
            .bind(&input.document_type)
            .bind(input.project_id)
            .bind(input.task_id)
            .bind(input.maintenance_request_id)
            .bind(input.uploaded_by_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Document>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM documents WHERE id = $1");
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Documents visible to the viewer, newest first, narrowed by `filter`.
    pub async fn list_for_viewer(
        pool: &PgPool,
        viewer_id: DbId,
        role: &str,
        filter: &DocumentFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Document>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM documents
             WHERE {}
               AND ($4::BIGINT IS NULL OR project_id = $4)
               AND ($5::BIGINT IS NULL OR maintenance_request_id = $5)
               AND ($6::TEXT IS NULL OR document_type = $6)
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3",
            visibility_clause(role)
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(viewer_id)
            .bind(limit)
            .bind(offset)
            .bind(filter.project_id)
            .bind(filter.maintenance_request_id)
            .bind(&filter.document_type)
            .fetch_all(pool)
            .await
    }

    pub async fn list_by_maintenance_request(
        pool: &PgPool,
        maintenance_request_id: DbId,
    ) -> Result<Vec<Document>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM documents
             WHERE maintenance_request_id = $1
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(maintenance_request_id)
            .fetch_all(pool)
            .await
    }

    /// Everyone linked to the document through its project, task or request.
    pub async fn linked_party_ids(pool: &PgPool, doc: &Document) -> Result<Vec<DbId>, sqlx::Error> {
        let ids: Vec<Option<DbId>> = sqlx::query_scalar(
            "SELECT p.client_id FROM projects p WHERE p.id = $1
             UNION ALL SELECT p.project_manager_id FROM projects p WHERE p.id = $1
             UNION ALL SELECT t.assigned_to_id FROM tasks t WHERE t.id = $2
             UNION ALL SELECT t.created_by_id FROM tasks t WHERE t.id = $2
             UNION ALL SELECT m.client_id FROM maintenance_requests m WHERE m.id = $3
             UNION ALL SELECT m.assigned_to_id FROM maintenance_requests m WHERE m.id = $3",
        )
        .bind(doc.project_id)
        .bind(doc.task_id)
        .bind(doc.maintenance_request_id)
        .fetch_all(pool)
        .await?;
        Ok(ids.into_iter().flatten().collect())
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Append a `View` or `Download` access record.
    pub async fn record_access(
        pool: &PgPool,
        document_id: DbId,
        accessed_by_id: DbId,
        access_type: &str,
        ip_address: Option<&str>,
    ) -> Result<DocumentAccess, sqlx::Error> {
        let query = format!(
            "INSERT INTO document_access_logs (document_id, accessed_by_id, access_type, ip_address)
             VALUES ($1, $2, $3, $4)
             RETURNING {ACCESS_COLUMNS}"
        );
        sqlx::query_as::<_, DocumentAccess>(&query)
            .bind(document_id)
            .bind(accessed_by_id)
            .bind(access_type)
            .bind(ip_address)
            .fetch_one(pool)
            .await
    }

    pub async fn list_access(
        pool: &PgPool,
        document_id: DbId,
    ) -> Result<Vec<DocumentAccess>, sqlx::Error> {
        let query = format!(
            "SELECT {ACCESS_COLUMNS} FROM document_access_logs
             WHERE document_id = $1
             ORDER BY accessed_at DESC"
        );
        sqlx::query_as::<_, DocumentAccess>(&query)
            .bind(document_id)
            .fetch_all(pool)
            .await
    }
}
