//! Domain error type shared by every crate in the workspace.

use crate::types::DbId;

/// Errors raised by domain rules, independent of transport.
///
/// The API layer maps each variant onto an HTTP status; the `db` layer never
/// produces these directly.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a missing row of the given entity kind.
    pub fn not_found(entity: &'static str, id: DbId) -> Self {
        Self::NotFound { entity, id }
    }

    /// Access denied for an authenticated caller.
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }
}

impl From<String> for CoreError {
    /// Validation helpers in this crate return `Result<(), String>`; `?` lifts
    /// those messages into [`CoreError::Validation`].
    fn from(msg: String) -> Self {
        Self::Validation(msg)
    }
}
