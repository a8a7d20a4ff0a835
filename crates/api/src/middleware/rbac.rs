//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role is not
//! in its allow-list. Row-level rules (ownership, assignment) are checked in
//! the handlers through `buildwise_core::access`.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use buildwise_core::error::CoreError;
use buildwise_core::roles::{ROLE_ADMIN, ROLE_CLIENT, ROLE_CONTRACTOR, ROLE_PROJECT_MANAGER};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticate, then require the caller's role to be one of `allowed`.
async fn require_role(
    parts: &mut Parts,
    state: &AppState,
    allowed: &[&str],
    message: &'static str,
) -> Result<AuthUser, AppError> {
    let user = AuthUser::from_request_parts(parts, state).await?;
    if !allowed.contains(&user.role.as_str()) {
        return Err(AppError::Core(CoreError::Forbidden(message.into())));
    }
    Ok(user)
}

/// Requires the `Admin` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(user): RequireAdmin) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_role(parts, state, &[ROLE_ADMIN], "Admin role required")
            .await
            .map(RequireAdmin)
    }
}

/// Requires `Admin` or `ProjectManager`.
pub struct RequireStaff(pub AuthUser);

impl FromRequestParts<AppState> for RequireStaff {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_role(
            parts,
            state,
            &[ROLE_ADMIN, ROLE_PROJECT_MANAGER],
            "Admin or ProjectManager role required",
        )
        .await
        .map(RequireStaff)
    }
}

/// Requires `Admin`, `ProjectManager` or `Contractor`: the roles that upload
/// project documents.
pub struct RequireUploader(pub AuthUser);

impl FromRequestParts<AppState> for RequireUploader {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_role(
            parts,
            state,
            &[ROLE_ADMIN, ROLE_PROJECT_MANAGER, ROLE_CONTRACTOR],
            "Admin, ProjectManager or Contractor role required",
        )
        .await
        .map(RequireUploader)
    }
}

/// Requires the `Client` role.
pub struct RequireClient(pub AuthUser);

impl FromRequestParts<AppState> for RequireClient {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_role(parts, state, &[ROLE_CLIENT], "Client role required")
            .await
            .map(RequireClient)
    }
}

/// Requires the `Contractor` role.
pub struct RequireContractor(pub AuthUser);

impl FromRequestParts<AppState> for RequireContractor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_role(parts, state, &[ROLE_CONTRACTOR], "Contractor role required")
            .await
            .map(RequireContractor)
    }
}
