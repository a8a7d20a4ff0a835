//! HTTP-level integration tests for registration, login, token refresh,
//! logout, lockout and admin user management.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_user, get_auth, post_json, post_json_auth, put_json_auth, user_with_token,
    TEST_PASSWORD,
};
use sqlx::PgPool;

async fn login(app: axum::Router, email: &str, password: &str) -> axum::http::Response<axum::body::Body> {
    let body = serde_json::json!({ "email": email, "password": password });
    post_json(app, "/api/v1/auth/login", body).await
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn register_defaults_to_client_and_returns_tokens(pool: PgPool) {
    let app = common::build_test_app(pool);
    let body = serde_json::json!({
        "email": "  New.Client@Example.com ",
        "password": "secret1",
        "first_name": "Thandi",
        "last_name": "Mokoena",
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert_eq!(json["expires_in"], 15 * 60);
    assert_eq!(json["user"]["email"], "new.client@example.com");
    assert_eq!(json["user"]["role"], "Client");
    assert!(json["user"].get("password_hash").is_none());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn register_cannot_claim_staff_roles(pool: PgPool) {
    let app = common::build_test_app(pool);
    let body = serde_json::json!({
        "email": "sneaky@example.com",
        "password": "secret1",
        "first_name": "Sne",
        "last_name": "Aky",
        "role": "Admin",
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn register_rejects_short_password(pool: PgPool) {
    let app = common::build_test_app(pool);
    let body = serde_json::json!({
        "email": "short@example.com",
        "password": "abc",
        "first_name": "S",
        "last_name": "P",
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn register_duplicate_email_conflicts(pool: PgPool) {
    create_user(&pool, "taken@example.com", "Client").await;
    let app = common::build_test_app(pool);
    let body = serde_json::json!({
        "email": "taken@example.com",
        "password": "secret1",
        "first_name": "Dup",
        "last_name": "Licate",
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// ---------------------------------------------------------------------------
// Login / refresh / logout
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn login_success_and_me(pool: PgPool) {
    let user = create_user(&pool, "pm@example.com", "ProjectManager").await;
    let app = common::build_test_app(pool.clone());

    let response = login(app, "PM@example.com", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["user"]["id"], user.id);
    let token = json["access_token"].as_str().unwrap().to_string();

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/auth/me", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["email"], "pm@example.com");
    assert_eq!(json["data"]["role"], "ProjectManager");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn login_wrong_password_and_unknown_user_are_401(pool: PgPool) {
    create_user(&pool, "someone@example.com", "Client").await;

    let app = common::build_test_app(pool.clone());
    let response = login(app, "someone@example.com", "not-the-password").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let app = common::build_test_app(pool);
    let response = login(app, "ghost@example.com", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn account_locks_after_five_failures(pool: PgPool) {
    create_user(&pool, "locked@example.com", "Client").await;

    for _ in 0..5 {
        let app = common::build_test_app(pool.clone());
        let response = login(app, "locked@example.com", "wrong").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // Even the right password is refused while locked.
    let app = common::build_test_app(pool);
    let response = login(app, "locked@example.com", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn refresh_rotates_and_old_token_stops_working(pool: PgPool) {
    create_user(&pool, "rotate@example.com", "Contractor").await;
    let app = common::build_test_app(pool.clone());
    let json = body_json(login(app, "rotate@example.com", TEST_PASSWORD).await).await;
    let original = json["refresh_token"].as_str().unwrap().to_string();

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "refresh_token": original });
    let response = post_json(app, "/api/v1/auth/refresh", body.clone()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_ne!(json["refresh_token"].as_str().unwrap(), original);

    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn logout_revokes_refresh_tokens(pool: PgPool) {
    create_user(&pool, "bye@example.com", "Client").await;
    let app = common::build_test_app(pool.clone());
    let json = body_json(login(app, "bye@example.com", TEST_PASSWORD).await).await;
    let access = json["access_token"].as_str().unwrap().to_string();
    let refresh = json["refresh_token"].as_str().unwrap().to_string();

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, "/api/v1/auth/logout", &access, serde_json::json!({})).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool);
    let body = serde_json::json!({ "refresh_token": refresh });
    let response = post_json(app, "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Admin user management
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn admin_routes_reject_non_admins(pool: PgPool) {
    let (_pm, token) = user_with_token(&pool, "pm@example.com", "ProjectManager").await;
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/v1/admin/users", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn admin_creates_and_deactivates_user(pool: PgPool) {
    let (admin, token) = user_with_token(&pool, "admin@example.com", "Admin").await;

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({
        "email": "newpm@example.com",
        "password": "secret12",
        "first_name": "New",
        "last_name": "Manager",
        "role": "ProjectManager",
    });
    let response = post_json_auth(app, "/api/v1/admin/users", &token, body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let new_id = json["data"]["id"].as_i64().unwrap();
    assert_eq!(json["data"]["role"], "ProjectManager");

    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/admin/users/{new_id}");
    let response = put_json_auth(app, &uri, &token, serde_json::json!({ "company": "BuildCo" })).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["company"], "BuildCo");

    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/admin/users/{new_id}/deactivate");
    let response = post_json_auth(app, &uri, &token, serde_json::json!({})).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The deactivated account can no longer log in.
    let app = common::build_test_app(pool.clone());
    let response = login(app, "newpm@example.com", "secret12").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Admins cannot deactivate themselves.
    let app = common::build_test_app(pool);
    let uri = format!("/api/v1/admin/users/{}/deactivate", admin.id);
    let response = post_json_auth(app, &uri, &token, serde_json::json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn directory_filters_by_role(pool: PgPool) {
    let (_client, token) = user_with_token(&pool, "client@example.com", "Client").await;
    create_user(&pool, "c1@example.com", "Contractor").await;
    create_user(&pool, "c2@example.com", "Contractor").await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/users?role=Contractor", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let users = json["data"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|u| u["role"] == "Contractor"));
}
