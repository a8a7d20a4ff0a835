//! First-start administrator account.
//!
//! Self-registration only creates `Client` and `Contractor` accounts, so the
//! first `Admin` comes from `BOOTSTRAP_ADMIN_EMAIL` / `BOOTSTRAP_ADMIN_PASSWORD`.

use buildwise_core::roles::ROLE_ADMIN;
use buildwise_core::validation::MIN_PASSWORD_LEN;
use buildwise_db::models::user::CreateUser;
use buildwise_db::repositories::UserRepo;
use buildwise_db::DbPool;

use crate::auth::password::{hash_password, validate_password_strength};
use crate::config::BootstrapAdmin;
use crate::error::{AppError, AppResult};

/// Create the admin unless a user with that email already exists.
///
/// Returns `true` when an account was created.
pub async fn ensure_admin(pool: &DbPool, admin: &BootstrapAdmin) -> AppResult<bool> {
    let email = admin.email.trim().to_lowercase();
    if UserRepo::find_by_email(pool, &email).await?.is_some() {
        tracing::debug!(email = %email, "Bootstrap admin already present");
        return Ok(false);
    }

    validate_password_strength(&admin.password, MIN_PASSWORD_LEN).map_err(AppError::BadRequest)?;
    let password_hash = hash_password(&admin.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        pool,
        &CreateUser {
            email,
            password_hash,
            first_name: "System".into(),
            last_name: "Administrator".into(),
            role: ROLE_ADMIN.into(),
            company: None,
            address: None,
            phone: None,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, email = %user.email, "Bootstrap admin created");
    Ok(true)
}
