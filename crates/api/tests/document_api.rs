//! Integration tests for document upload, access and deletion.

mod common;

use axum::http::StatusCode;
use common::{
    body_bytes, body_json, delete_auth, get_auth, post_json_auth, post_multipart_auth,
    user_with_token,
};
use sqlx::PgPool;

async fn create_project(pool: &PgPool, token: &str, client_id: i64) -> i64 {
    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({
        "name": "Soweto Clinic",
        "location": "Soweto",
        "start_date": "2025-01-01",
        "end_date": "2025-12-31",
        "budget": 2500000.0,
        "client_id": client_id,
    });
    let response = post_json_auth(app, "/api/v1/projects", token, body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn upload_view_download_and_access_log(pool: PgPool) {
    let (_pm, pm_token) = user_with_token(&pool, "pm@example.com", "ProjectManager").await;
    let (client, client_token) = user_with_token(&pool, "client@example.com", "Client").await;
    let (_other, other_token) = user_with_token(&pool, "other@example.com", "Client").await;
    let project_id = create_project(&pool, &pm_token, client.id).await;
    let project_field = project_id.to_string();

    let app = common::build_test_app(pool);

    let response = post_multipart_auth(
        app.clone(),
        "/api/v1/documents",
        &pm_token,
        "ground-floor.pdf",
        b"%PDF-1.7 ground floor",
        &[
            ("name", "Ground floor plan"),
            ("document_type", "Blueprint"),
            ("project_id", project_field.as_str()),
        ],
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let document = body_json(response).await["data"].clone();
    assert_eq!(document["name"], "Ground floor plan");
    assert_eq!(document["document_type"], "Blueprint");
    assert_eq!(document["file_type"], ".pdf");
    assert_eq!(document["file_size"], 21);
    assert_eq!(document["project_id"], project_id);
    let uri = format!("/api/v1/documents/{}", document["id"]);

    // The project's client sees it; another client does not.
    let json = body_json(get_auth(app.clone(), "/api/v1/documents", &client_token).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    let json = body_json(get_auth(app.clone(), "/api/v1/documents", &other_token).await).await;
    assert!(json["data"].as_array().unwrap().is_empty());

    let response = get_auth(app.clone(), &uri, &other_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get_auth(app.clone(), &uri, &client_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["data"].get("access_log").is_none());

    let response = get_auth(app.clone(), &format!("{uri}/download"), &client_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response.headers()["content-disposition"].to_str().unwrap().to_string();
    assert!(disposition.contains("Ground floor plan.pdf"));
    assert_eq!(body_bytes(response).await, b"%PDF-1.7 ground floor".to_vec());

    // Staff see the log, including their own view.
    let json = body_json(get_auth(app, &uri, &pm_token).await).await;
    let log = json["data"]["access_log"].as_array().unwrap();
    assert_eq!(log.len(), 3);
    let kinds: Vec<&str> = log.iter().map(|a| a["access_type"].as_str().unwrap()).collect();
    assert_eq!(kinds.iter().filter(|k| **k == "View").count(), 2);
    assert_eq!(kinds.iter().filter(|k| **k == "Download").count(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn upload_is_validated(pool: PgPool) {
    let (_pm, pm_token) = user_with_token(&pool, "pm@example.com", "ProjectManager").await;
    let (client, client_token) = user_with_token(&pool, "client@example.com", "Client").await;
    let (_sub, sub_token) = user_with_token(&pool, "sub@example.com", "Contractor").await;
    let project_id = create_project(&pool, &pm_token, client.id).await;

    let app = common::build_test_app(pool);

    let response =
        post_multipart_auth(app.clone(), "/api/v1/documents", &client_token, "a.pdf", b"x", &[]).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response =
        post_multipart_auth(app.clone(), "/api/v1/documents", &pm_token, "run.sh", b"#!", &[]).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_multipart_auth(
        app.clone(),
        "/api/v1/documents",
        &pm_token,
        "a.pdf",
        b"x",
        &[("document_type", "Horoscope")],
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // A contractor not on the project cannot file documents against it.
    let project_field = project_id.to_string();
    let response = post_multipart_auth(
        app.clone(),
        "/api/v1/documents",
        &sub_token,
        "site.jpg",
        b"\xff\xd8\xff",
        &[("project_id", project_field.as_str())],
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Without a project the upload stands alone and defaults to Other.
    let response =
        post_multipart_auth(app, "/api/v1/documents", &sub_token, "site.jpg", b"\xff\xd8\xff", &[]).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let document = body_json(response).await["data"].clone();
    assert_eq!(document["document_type"], "Other");
    assert_eq!(document["name"], "site.jpg");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn only_admins_or_the_uploading_manager_delete(pool: PgPool) {
    let (_pm, pm_token) = user_with_token(&pool, "pm@example.com", "ProjectManager").await;
    let (_pm2, pm2_token) = user_with_token(&pool, "pm2@example.com", "ProjectManager").await;
    let (_admin, admin_token) = user_with_token(&pool, "admin@example.com", "Admin").await;

    let app = common::build_test_app(pool);

    let mut ids = Vec::new();
    for name in ["one.txt", "two.txt"] {
        let response =
            post_multipart_auth(app.clone(), "/api/v1/documents", &pm_token, name, b"notes", &[]).await;
        ids.push(body_json(response).await["data"]["id"].clone());
    }
    let first = format!("/api/v1/documents/{}", ids[0]);
    let second = format!("/api/v1/documents/{}", ids[1]);

    let response = delete_auth(app.clone(), &first, &pm2_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete_auth(app.clone(), &first, &pm_token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = get_auth(app.clone(), &first, &pm_token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete_auth(app.clone(), &second, &admin_token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = delete_auth(app, &second, &admin_token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

async fn submit_maintenance_request(app: axum::Router, token: &str) -> i64 {
    let body = serde_json::json!({
        "title": "Leaking geyser",
        "description": "Water through the ceiling",
        "priority": "High",
        "location": "Unit 4"
    });
    let response = post_json_auth(app, "/api/v1/maintenance", token, body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn linked_task_and_request_must_be_visible(pool: PgPool) {
    let (_pm, pm_token) = user_with_token(&pool, "pm@example.com", "ProjectManager").await;
    let (_client, client_token) = user_with_token(&pool, "client@example.com", "Client").await;
    let (builder, builder_token) = user_with_token(&pool, "builder@example.com", "Contractor").await;
    let (_other, other_token) = user_with_token(&pool, "other@example.com", "Contractor").await;
    let uploads = tempfile::tempdir().unwrap();
    let app = common::build_test_app_in(pool, uploads.path());

    let request_id = submit_maintenance_request(app.clone(), &client_token).await;
    let body = serde_json::json!({
        "title": "Replace geyser",
        "due_date": "2030-03-01",
        "assigned_to_id": builder.id,
        "maintenance_request_id": request_id
    });
    let response = post_json_auth(app.clone(), "/api/v1/tasks", &pm_token, body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let task_id = body_json(response).await["data"]["id"].as_i64().unwrap().to_string();
    let request_field = request_id.to_string();

    // A contractor with no part in the task or the request cannot link to them.
    let response = post_multipart_auth(
        app.clone(),
        "/api/v1/documents",
        &other_token,
        "invoice.pdf",
        b"%PDF-1.7",
        &[("task_id", task_id.as_str())],
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = post_multipart_auth(
        app.clone(),
        "/api/v1/documents",
        &other_token,
        "invoice.pdf",
        b"%PDF-1.7",
        &[("maintenance_request_id", request_field.as_str())],
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Unknown and malformed ids are refused before anything is written.
    let response = post_multipart_auth(
        app.clone(),
        "/api/v1/documents",
        &builder_token,
        "photo.jpg",
        b"jpeg",
        &[("task_id", "999999")],
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = post_multipart_auth(
        app.clone(),
        "/api/v1/documents",
        &builder_token,
        "photo.jpg",
        b"jpeg",
        &[("maintenance_request_id", "twelve")],
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(common::count_files(uploads.path()), 0);

    // The assignee links a photo to their task.
    let response = post_multipart_auth(
        app.clone(),
        "/api/v1/documents",
        &builder_token,
        "photo.jpg",
        b"jpeg",
        &[("task_id", task_id.as_str()), ("document_type", "Photo")],
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(common::count_files(uploads.path()), 1);

    let json = body_json(get_auth(app, "/api/v1/documents", &other_token).await).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}
