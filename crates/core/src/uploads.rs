//! Upload naming and validation rules.
//!
//! Files are written under a configurable upload root, one subdirectory per
//! feature area. Stored names are prefixed with a UUID so two uploads of
//! `plan.pdf` never collide; the original name is kept for display.

/// Extensions accepted for project documents (lower-case, with dot).
pub const ALLOWED_DOCUMENT_EXTENSIONS: &[&str] =
    &[".pdf", ".docx", ".png", ".jpg", ".jpeg", ".dwg", ".txt"];

pub const DOCUMENTS_DIR: &str = "documents";
pub const MAINTENANCE_DIR: &str = "maintenance";
pub const MESSAGES_DIR: &str = "messages";

/// Lower-cased extension including the dot, or an empty string.
pub fn file_extension(file_name: &str) -> String {
    match file_name.rfind('.') {
        Some(idx) if idx + 1 < file_name.len() => file_name[idx..].to_lowercase(),
        _ => String::new(),
    }
}

pub fn validate_document_extension(file_name: &str) -> Result<String, String> {
    let ext = file_extension(file_name);
    if ALLOWED_DOCUMENT_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(format!(
            "Unsupported file type '{ext}'. Allowed: {}",
            ALLOWED_DOCUMENT_EXTENSIONS.join(", ")
        ))
    }
}

/// Drop any directory components and characters that are unsafe in a path.
///
/// Browsers on Windows send full paths (`C:\Users\...\plan.pdf`), so both
/// separator styles are stripped.
pub fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    let cleaned: String = base
        .chars()
        .map(|c| match c {
            ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

/// `<uuid>_<sanitized name>`.
pub fn stored_file_name(original: &str) -> String {
    format!("{}_{}", uuid::Uuid::new_v4(), sanitize_file_name(original))
}

/// Path stored in the database, relative to the upload root.
pub fn relative_path(area: &str, stored_name: &str) -> String {
    format!("{area}/{stored_name}")
}

/// Reject stored relative paths that would escape the upload root.
pub fn is_safe_relative_path(path: &str) -> bool {
    !path.is_empty()
        && !path.starts_with('/')
        && !path.contains('\\')
        && path.split('/').all(|seg| !seg.is_empty() && seg != "..")
}
