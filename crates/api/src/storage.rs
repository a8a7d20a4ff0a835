//! Upload storage on the local filesystem.
//!
//! Files live under `ServerConfig::upload_dir`, one subdirectory per area
//! (see `buildwise_core::uploads`). The database stores the path relative to
//! that root, and downloads always go back through [`download_response`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use axum::body::{Body, Bytes};
use axum::extract::Multipart;
use axum::http::{header, StatusCode};
use axum::response::Response;
use buildwise_core::uploads::{
    file_extension, is_safe_relative_path, relative_path, sanitize_file_name, stored_file_name,
};
use tokio_util::io::ReaderStream;

use crate::error::{AppError, AppResult};

/// The `file` part of a multipart form.
#[derive(Debug)]
pub struct UploadedFile {
    /// Client-supplied name, already stripped of directory components.
    pub file_name: String,
    pub data: Bytes,
}

/// A parsed multipart form: at most one file plus the text fields.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub file: Option<UploadedFile>,
    pub fields: HashMap<String, String>,
}

impl UploadForm {
    /// The uploaded file, or 400 if the form had none or it was empty.
    pub fn take_file(&mut self) -> AppResult<UploadedFile> {
        match self.file.take() {
            Some(file) if !file.data.is_empty() => Ok(file),
            Some(_) => Err(AppError::BadRequest("Uploaded file is empty".into())),
            None => Err(AppError::BadRequest("Missing required 'file' field".into())),
        }
    }

    /// A trimmed, non-empty text field.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// An optional numeric id field; an empty value counts as absent.
    pub fn id(&self, name: &str) -> AppResult<Option<i64>> {
        self.text(name)
            .map(|v| {
                v.parse::<i64>()
                    .map_err(|_| AppError::BadRequest(format!("'{name}' must be a number")))
            })
            .transpose()
    }
}

/// Drain a multipart body. The part named `file` is kept as bytes, every
/// other part as text.
pub async fn read_multipart(mut multipart: Multipart) -> AppResult<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name == "file" {
            let file_name = sanitize_file_name(field.file_name().unwrap_or("upload"));
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            form.file = Some(UploadedFile { file_name, data });
        } else if !name.is_empty() {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            form.fields.insert(name, text);
        }
    }

    Ok(form)
}

/// Where a file ended up after [`save_upload`].
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// `<uuid>_<name>` on disk.
    pub stored_name: String,
    /// `<area>/<stored_name>`, relative to the upload root.
    pub relative_path: String,
    /// Lower-case extension with the dot.
    pub file_type: String,
    pub file_size: i64,
}

/// Write `file` under `<root>/<area>/`, creating the directory if needed.
pub async fn save_upload(root: &Path, area: &str, file: &UploadedFile) -> AppResult<StoredFile> {
    let dir = root.join(area);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to create upload directory: {e}")))?;

    let stored_name = stored_file_name(&file.file_name);
    tokio::fs::write(dir.join(&stored_name), &file.data)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to write upload: {e}")))?;

    tracing::debug!(area, stored_name = %stored_name, bytes = file.data.len(), "Stored upload");

    Ok(StoredFile {
        relative_path: relative_path(area, &stored_name),
        file_type: file_extension(&file.file_name),
        file_size: file.data.len() as i64,
        stored_name,
    })
}

/// Resolve a stored relative path against the root, refusing anything that
/// could escape it.
pub fn resolve(root: &Path, relative: &str) -> AppResult<PathBuf> {
    if !is_safe_relative_path(relative) {
        return Err(AppError::InternalError(format!(
            "Refusing unsafe stored path '{relative}'"
        )));
    }
    Ok(root.join(relative))
}

/// Delete a stored file. A file that is already gone is not an error.
pub async fn remove_upload(root: &Path, relative: &str) -> AppResult<()> {
    let path = resolve(root, relative)?;
    match tokio::fs::remove_file(&path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "Upload already missing on delete");
            Ok(())
        }
        Err(e) => Err(AppError::InternalError(format!("Failed to delete upload: {e}"))),
    }
}

/// Remove a file whose database row was never written. Failures are
/// logged rather than returned so the original error reaches the caller.
pub async fn discard_upload(root: &Path, relative: &str) {
    if let Err(e) = remove_upload(root, relative).await {
        tracing::warn!(path = relative, error = %e, "Failed to discard orphaned upload");
    }
}

/// Stream a stored file back as an attachment named `download_name`.
pub async fn download_response(
    root: &Path,
    relative: &str,
    download_name: &str,
) -> AppResult<Response> {
    let path = resolve(root, relative)?;
    let file = tokio::fs::File::open(&path)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to open upload: {e}")))?;
    let file_size = file
        .metadata()
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?
        .len();

    let disposition = format!(
        "attachment; filename=\"{}\"",
        sanitize_file_name(download_name).replace('"', "_")
    );

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(header::CONTENT_LENGTH, file_size.to_string())
        .header(header::CONTENT_DISPOSITION, disposition)
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| AppError::InternalError(e.to_string()))
}

/// Name offered for download: the display name plus the stored extension
/// when the display name lacks one.
pub fn download_name(display_name: &str, file_type: &str) -> String {
    if file_extension(display_name).is_empty() {
        format!("{display_name}{file_type}")
    } else {
        display_name.to_string()
    }
}
