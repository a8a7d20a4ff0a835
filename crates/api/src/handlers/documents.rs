//! Handlers for the `/documents` resource: upload, listing, download and
//! the per-document access log.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use buildwise_core::access::{can_delete_document, can_view_document, DocumentLinks};
use buildwise_core::audit::{actions, entities};
use buildwise_core::status::{validate_one_of, ACCESS_DOWNLOAD, ACCESS_VIEW, DOCUMENT_TYPES};
use buildwise_core::types::DbId;
use buildwise_core::uploads::{validate_document_extension, DOCUMENTS_DIR};
use buildwise_core::validation::{check_max_len, MAX_TASK_DESCRIPTION_LEN, MAX_TITLE_LEN};
use buildwise_db::models::document::{CreateDocument, Document, DocumentAccess, DocumentFilter};
use buildwise_db::repositories::DocumentRepo;
use serde::{Deserialize, Serialize};

use super::maintenance::load_visible_request;
use super::projects::load_visible_project;
use super::tasks::load_visible_task;
use super::{forbidden, invalid, not_found, validate};
use crate::audit::AuditEvent;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::client::ClientInfo;
use crate::middleware::rbac::{RequireStaff, RequireUploader};
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::storage::{
    discard_upload, download_name, download_response, read_multipart, remove_upload, save_upload,
};

const DEFAULT_DOCUMENT_TYPE: &str = "Other";

/// Query parameters for `GET /documents`.
#[derive(Debug, Default, Deserialize)]
pub struct DocumentListParams {
    pub project_id: Option<DbId>,
    pub maintenance_request_id: Option<DbId>,
    pub document_type: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// A document plus, for staff, its access history.
#[derive(Debug, Serialize)]
pub struct DocumentDetail {
    #[serde(flatten)]
    pub document: Document,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_log: Option<Vec<DocumentAccess>>,
}

/// Load a document and check the caller is linked to it.
async fn load_visible_document(
    state: &AppState,
    auth: &AuthUser,
    id: DbId,
) -> AppResult<Document> {
    let document = DocumentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Document", id))?;
    let links = DocumentLinks {
        uploaded_by_id: document.uploaded_by_id,
        linked_party_ids: DocumentRepo::linked_party_ids(&state.pool, &document).await?,
    };
    if !can_view_document(auth.viewer(), &links) {
        return Err(forbidden("You do not have access to this document"));
    }
    Ok(document)
}

/// GET /api/v1/documents
pub async fn list_documents(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<DocumentListParams>,
) -> AppResult<Json<DataResponse<Vec<Document>>>> {
    let page = PaginationParams {
        limit: params.limit,
        offset: params.offset,
    };
    let filter = DocumentFilter {
        project_id: params.project_id,
        maintenance_request_id: params.maintenance_request_id,
        document_type: params.document_type,
    };
    let documents = DocumentRepo::list_for_viewer(
        &state.pool,
        auth.user_id,
        &auth.role,
        &filter,
        page.limit(),
        page.offset(),
    )
    .await?;
    Ok(Json(DataResponse { data: documents }))
}

/// POST /api/v1/documents
///
/// Multipart form: `file` plus optional `name`, `description`,
/// `document_type`, `project_id`, `task_id`, `maintenance_request_id`.
pub async fn upload_document(
    State(state): State<AppState>,
    RequireUploader(auth): RequireUploader,
    client: ClientInfo,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<Document>>)> {
    // 1. Parse and validate the form.
    let mut form = read_multipart(multipart).await?;
    let file = form.take_file()?;
    let extension = validate_document_extension(&file.file_name).map_err(invalid)?;

    let name = form.text("name").unwrap_or_else(|| file.file_name.clone());
    validate(check_max_len("Name", &name, MAX_TITLE_LEN))?;
    let description = form.text("description").unwrap_or_default();
    validate(check_max_len("Description", &description, MAX_TASK_DESCRIPTION_LEN))?;
    let document_type = form
        .text("document_type")
        .unwrap_or_else(|| DEFAULT_DOCUMENT_TYPE.to_string());
    validate(validate_one_of("document type", &document_type, DOCUMENT_TYPES))?;

    // Linked records must exist and be visible to the uploader.
    let project_id = form.id("project_id")?;
    let task_id = form.id("task_id")?;
    let maintenance_request_id = form.id("maintenance_request_id")?;
    if let Some(project_id) = project_id {
        load_visible_project(&state, &auth, project_id).await?;
    }
    if let Some(task_id) = task_id {
        load_visible_task(&state, &auth, task_id).await?;
    }
    if let Some(request_id) = maintenance_request_id {
        load_visible_request(&state, &auth, request_id).await?;
    }

    // 2. Store the bytes, then the row; a failed insert removes the file.
    let stored = save_upload(&state.config.upload_dir, DOCUMENTS_DIR, &file).await?;
    let created = DocumentRepo::create(
        &state.pool,
        &CreateDocument {
            name,
            description,
            file_name: stored.stored_name,
            file_path: stored.relative_path.clone(),
            file_type: extension,
            file_size: stored.file_size,
            document_type,
            project_id,
            task_id,
            maintenance_request_id,
            uploaded_by_id: auth.user_id,
        },
    )
    .await;
    let document = match created {
        Ok(document) => document,
        Err(e) => {
            discard_upload(&state.config.upload_dir, &stored.relative_path).await;
            return Err(e.into());
        }
    };
    tracing::info!(document_id = document.id, user_id = auth.user_id, size = document.file_size, "Document uploaded");

    AuditEvent::new(entities::DOCUMENT, document.id, actions::UPLOAD)
        .by(auth.user_id)
        .client(&client)
        .after(&document)
        .record(&state.pool)
        .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: document })))
}

/// GET /api/v1/documents/{id}
///
/// Records a `View` access.
pub async fn get_document(
    State(state): State<AppState>,
    auth: AuthUser,
    client: ClientInfo,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<DocumentDetail>>> {
    let document = load_visible_document(&state, &auth, id).await?;
    DocumentRepo::record_access(
        &state.pool,
        id,
        auth.user_id,
        ACCESS_VIEW,
        client.ip_address.as_deref(),
    )
    .await?;

    let access_log = if auth.viewer().is_staff() {
        Some(DocumentRepo::list_access(&state.pool, id).await?)
    } else {
        None
    };
    Ok(Json(DataResponse {
        data: DocumentDetail {
            document,
            access_log,
        },
    }))
}

/// GET /api/v1/documents/{id}/download
///
/// Records a `Download` access and streams the stored bytes.
pub async fn download_document(
    State(state): State<AppState>,
    auth: AuthUser,
    client: ClientInfo,
    Path(id): Path<DbId>,
) -> AppResult<Response> {
    let document = load_visible_document(&state, &auth, id).await?;
    DocumentRepo::record_access(
        &state.pool,
        id,
        auth.user_id,
        ACCESS_DOWNLOAD,
        client.ip_address.as_deref(),
    )
    .await?;

    download_response(
        &state.config.upload_dir,
        &document.file_path,
        &download_name(&document.name, &document.file_type),
    )
    .await
}

/// DELETE /api/v1/documents/{id}
///
/// Admins delete any document; project managers only their own uploads.
/// The stored file is removed after the row.
pub async fn delete_document(
    State(state): State<AppState>,
    RequireStaff(auth): RequireStaff,
    client: ClientInfo,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let document = DocumentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Document", id))?;
    if !can_delete_document(auth.viewer(), document.uploaded_by_id) {
        return Err(forbidden("Project managers can only delete their own uploads"));
    }

    if !DocumentRepo::delete(&state.pool, id).await? {
        return Err(not_found("Document", id));
    }
    remove_upload(&state.config.upload_dir, &document.file_path).await?;

    AuditEvent::new(entities::DOCUMENT, id, actions::DELETE)
        .by(auth.user_id)
        .client(&client)
        .before(&document)
        .record(&state.pool)
        .await;

    Ok(StatusCode::NO_CONTENT)
}
