//! Handlers for the `/auth` resource (register, login, refresh, logout, me).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use buildwise_core::audit::{actions, entities};
use buildwise_core::error::CoreError;
use buildwise_core::roles::{validate_role, DEFAULT_ROLE, SELF_REGISTER_ROLES};
use buildwise_core::validation::{require_non_empty, validate_email, MIN_PASSWORD_LEN};
use buildwise_db::models::session::CreateSession;
use buildwise_db::models::user::{CreateUser, User, UserResponse};
use buildwise_db::repositories::{SessionRepo, UserRepo};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::{invalid, not_found, validate};
use crate::audit::AuditEvent;
use crate::auth::jwt::{generate_access_token, generate_refresh_token, hash_refresh_token};
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::client::ClientInfo;
use crate::response::DataResponse;
use crate::state::AppState;

/// Maximum consecutive failed login attempts before locking the account.
const MAX_FAILED_ATTEMPTS: i32 = 5;

/// Duration in minutes to lock an account after exceeding failed attempts.
const LOCK_DURATION_MINS: i64 = 15;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    /// `Client` (default) or `Contractor`.
    pub role: Option<String>,
    pub company: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Returned by register, login and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Public sign-up for clients and contractors. Staff accounts are created by
/// an admin. Returns 201 with a fresh session.
pub async fn register(
    State(state): State<AppState>,
    client: ClientInfo,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let email = input.email.trim().to_lowercase();
    validate(validate_email(&email))?;
    validate(require_non_empty("First name", &input.first_name))?;
    validate(require_non_empty("Last name", &input.last_name))?;
    validate_password_strength(&input.password, MIN_PASSWORD_LEN).map_err(invalid)?;

    let role = input.role.as_deref().unwrap_or(DEFAULT_ROLE);
    validate(validate_role(role))?;
    if !SELF_REGISTER_ROLES.contains(&role) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Role '{role}' cannot be self-registered"
        ))));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            email,
            password_hash,
            first_name: input.first_name.trim().to_string(),
            last_name: input.last_name.trim().to_string(),
            role: role.to_string(),
            company: input.company,
            address: input.address,
            phone: input.phone,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, role = %user.role, "User registered");
    AuditEvent::new(entities::USER, user.id, actions::CREATE)
        .by(user.id)
        .client(&client)
        .after(&UserResponse::from(user.clone()))
        .describe("Self-registration")
        .record(&state.pool)
        .await;

    let response = create_auth_response(&state, user, &client).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/auth/login
///
/// Authenticate with email + password. Returns access and refresh tokens.
pub async fn login(
    State(state): State<AppState>,
    client: ClientInfo,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    // 1. Find user by email.
    let email = input.email.trim().to_lowercase();
    let user = UserRepo::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized(INVALID_CREDENTIALS.into())))?;

    // 2. Check if the account is active.
    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    // 3. Check if the account is temporarily locked.
    if let Some(locked_until) = user.locked_until {
        if locked_until > Utc::now() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Account is temporarily locked. Try again later.".into(),
            )));
        }
    }

    // 4. Verify password.
    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        // 5. On failure: increment counter, lock once the threshold is reached.
        let failures = UserRepo::increment_failed_login(&state.pool, user.id).await?;
        if failures >= MAX_FAILED_ATTEMPTS {
            let lock_until = Utc::now() + chrono::Duration::minutes(LOCK_DURATION_MINS);
            UserRepo::lock_account(&state.pool, user.id, lock_until).await?;
            tracing::warn!(user_id = user.id, failures, "Account locked after failed logins");
        }

        return Err(AppError::Core(CoreError::Unauthorized(
            INVALID_CREDENTIALS.into(),
        )));
    }

    // 6. On success: reset failed count, set last_login_at.
    UserRepo::record_successful_login(&state.pool, user.id).await?;
    AuditEvent::new(entities::USER, user.id, actions::LOGIN)
        .by(user.id)
        .client(&client)
        .record(&state.pool)
        .await;

    // 7. Generate tokens and create session.
    let response = create_auth_response(&state, user, &client).await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a valid refresh token for new access + refresh tokens. The old
/// session is revoked in the same transaction that creates the new one.
pub async fn refresh(
    State(state): State<AppState>,
    client: ClientInfo,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let rejected = || AppError::Core(CoreError::Unauthorized("Invalid or expired refresh token".into()));

    // 1. Find the active session for this token.
    let token_hash = hash_refresh_token(&input.refresh_token);
    let session = SessionRepo::find_by_refresh_token_hash(&state.pool, &token_hash)
        .await?
        .ok_or_else(rejected)?;

    // 2. The user must still exist and be active.
    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;
    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    // 3. Rotate: revoke the old session, insert the new one.
    let (refresh_plaintext, refresh_hash) = generate_refresh_token();
    let new_session = new_session(&state, user.id, refresh_hash, &client);
    SessionRepo::rotate(&state.pool, session.id, &new_session)
        .await?
        .ok_or_else(rejected)?;

    let access_token = issue_access_token(&state, &user)?;
    Ok(Json(AuthResponse {
        access_token,
        refresh_token: refresh_plaintext,
        expires_in: state.config.jwt.access_token_ttl_secs(),
        user: user.into(),
    }))
}

/// POST /api/v1/auth/logout
///
/// Revoke all sessions for the authenticated user. Returns 204 No Content.
pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> AppResult<StatusCode> {
    let revoked = SessionRepo::revoke_all_for_user(&state.pool, auth.user_id).await?;
    tracing::debug!(user_id = auth.user_id, revoked, "User logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| not_found("User", auth.user_id))?;
    Ok(Json(DataResponse { data: user.into() }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn issue_access_token(state: &AppState, user: &User) -> AppResult<String> {
    generate_access_token(user.id, &user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))
}

fn new_session(
    state: &AppState,
    user_id: i64,
    refresh_token_hash: String,
    client: &ClientInfo,
) -> CreateSession {
    CreateSession {
        user_id,
        refresh_token_hash,
        expires_at: Utc::now() + chrono::Duration::days(state.config.jwt.refresh_token_expiry_days),
        user_agent: client.user_agent.clone(),
        ip_address: client.ip_address.clone(),
    }
}

/// Generate access + refresh tokens, persist a session row, and build the response.
async fn create_auth_response(
    state: &AppState,
    user: User,
    client: &ClientInfo,
) -> AppResult<AuthResponse> {
    let access_token = issue_access_token(state, &user)?;
    let (refresh_plaintext, refresh_hash) = generate_refresh_token();
    SessionRepo::create(&state.pool, &new_session(state, user.id, refresh_hash, client)).await?;

    Ok(AuthResponse {
        access_token,
        refresh_token: refresh_plaintext,
        expires_in: state.config.jwt.access_token_ttl_secs(),
        user: user.into(),
    })
}
