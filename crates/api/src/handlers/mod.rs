//! HTTP handlers, one module per resource.

pub mod analysis;
pub mod audit;
pub mod auth;
pub mod dashboard;
pub mod documents;
pub mod invoices;
pub mod maintenance;
pub mod messages;
pub mod notifications;
pub mod projects;
pub mod quotations;
pub mod tasks;
pub mod users;

use buildwise_core::error::CoreError;
use buildwise_core::types::DbId;

use crate::error::{AppError, AppResult};

/// Lift a `buildwise_core` validation message into a 400 response.
pub(crate) fn validate(result: Result<(), String>) -> AppResult<()> {
    result.map_err(invalid)
}

/// 400 carrying a validation message.
pub(crate) fn invalid(msg: String) -> AppError {
    AppError::Core(CoreError::Validation(msg))
}

/// 404 for a missing row of `entity`.
pub(crate) fn not_found(entity: &'static str, id: DbId) -> AppError {
    AppError::Core(CoreError::not_found(entity, id))
}

/// 403 with `message`.
pub(crate) fn forbidden(message: &str) -> AppError {
    AppError::Core(CoreError::forbidden(message))
}
