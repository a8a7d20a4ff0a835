//! Handlers for the user directory and `/admin/users` management.
//!
//! The directory is open to any signed-in user (recipient and assignee
//! pickers); everything under `/admin` requires [`RequireAdmin`].

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use buildwise_core::audit::{actions, entities};
use buildwise_core::roles::validate_role;
use buildwise_core::types::DbId;
use buildwise_core::validation::{require_non_empty, validate_email, MIN_PASSWORD_LEN};
use buildwise_db::models::user::{CreateUser, UpdateUser, UserResponse, UserSummary};
use buildwise_db::repositories::{SessionRepo, UserRepo};
use serde::Deserialize;

use super::{invalid, not_found, validate};
use crate::audit::AuditEvent;
use crate::auth::password::{hash_password, validate_password_strength};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::client::ClientInfo;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /users`.
#[derive(Debug, Deserialize)]
pub struct DirectoryParams {
    pub role: Option<String>,
}

/// Request body for `POST /admin/users`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub company: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

/// GET /api/v1/users
///
/// Active users other than the caller, optionally filtered by role.
pub async fn directory(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<DirectoryParams>,
) -> AppResult<Json<DataResponse<Vec<UserSummary>>>> {
    if let Some(role) = params.role.as_deref() {
        validate(validate_role(role))?;
    }
    let users = UserRepo::directory(&state.pool, auth.user_id, params.role.as_deref()).await?;
    Ok(Json(DataResponse { data: users }))
}

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let users = UserRepo::list(&state.pool).await?;
    Ok(Json(DataResponse {
        data: users.into_iter().map(UserResponse::from).collect(),
    }))
}

/// GET /api/v1/admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("User", id))?;
    Ok(Json(DataResponse { data: user.into() }))
}

/// POST /api/v1/admin/users
///
/// Create a user with any role, including staff roles that cannot
/// self-register.
pub async fn create_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    client: ClientInfo,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    let email = input.email.trim().to_lowercase();
    validate(validate_email(&email))?;
    validate(require_non_empty("First name", &input.first_name))?;
    validate(require_non_empty("Last name", &input.last_name))?;
    validate(validate_role(&input.role))?;
    validate_password_strength(&input.password, MIN_PASSWORD_LEN).map_err(invalid)?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            email,
            password_hash,
            first_name: input.first_name.trim().to_string(),
            last_name: input.last_name.trim().to_string(),
            role: input.role,
            company: input.company,
            address: input.address,
            phone: input.phone,
        },
    )
    .await?;

    let response = UserResponse::from(user);
    AuditEvent::new(entities::USER, response.id, actions::CREATE)
        .by(admin.user_id)
        .client(&client)
        .after(&response)
        .record(&state.pool)
        .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: response })))
}

/// PUT /api/v1/admin/users/{id}
///
/// Update profile fields, role or active flag. Passwords are not changed here.
pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    client: ClientInfo,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUser>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    if let Some(role) = input.role.as_deref() {
        validate(validate_role(role))?;
    }
    if let Some(name) = input.first_name.as_deref() {
        validate(require_non_empty("First name", name))?;
    }
    if let Some(name) = input.last_name.as_deref() {
        validate(require_non_empty("Last name", name))?;
    }

    let before = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("User", id))?;
    let user = UserRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found("User", id))?;

    if input.is_active == Some(false) {
        SessionRepo::revoke_all_for_user(&state.pool, id).await?;
    }

    let response = UserResponse::from(user);
    AuditEvent::new(entities::USER, id, actions::UPDATE)
        .by(admin.user_id)
        .client(&client)
        .before(&UserResponse::from(before))
        .after(&response)
        .record(&state.pool)
        .await;

    Ok(Json(DataResponse { data: response }))
}

/// POST /api/v1/admin/users/{id}/deactivate
///
/// Soft-deactivate a user and revoke their sessions. Admins cannot
/// deactivate themselves.
pub async fn deactivate_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    client: ClientInfo,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if id == admin.user_id {
        return Err(AppError::BadRequest(
            "Administrators cannot deactivate their own account".into(),
        ));
    }

    let deactivated = UserRepo::deactivate(&state.pool, id).await?;
    if !deactivated {
        return Err(not_found("User", id));
    }
    SessionRepo::revoke_all_for_user(&state.pool, id).await?;

    AuditEvent::new(entities::USER, id, actions::DELETE)
        .by(admin.user_id)
        .client(&client)
        .describe("Account deactivated")
        .record(&state.pool)
        .await;

    Ok(StatusCode::NO_CONTENT)
}
