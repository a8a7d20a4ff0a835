//! Integration tests for maintenance requests: attachments and status
//! history.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, post_json_auth, post_multipart_auth, user_with_token};
use sqlx::PgPool;

async fn submit_request(app: axum::Router, token: &str) -> String {
    let body = serde_json::json!({
        "title": "Cracked window",
        "description": "Lounge window cracked in the storm",
        "priority": "Medium",
        "location": "Unit 9",
        "property_type": "Residential"
    });
    let response = post_json_auth(app, "/api/v1/maintenance", token, body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].to_string()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn attachments_are_stored_as_maintenance_documents(pool: PgPool) {
    let (_pm, pm_token) = user_with_token(&pool, "pm@example.com", "ProjectManager").await;
    let (client, client_token) = user_with_token(&pool, "client@example.com", "Client").await;
    let (_other, other_token) = user_with_token(&pool, "other@example.com", "Client").await;
    let (_builder, builder_token) = user_with_token(&pool, "builder@example.com", "Contractor").await;
    let uploads = tempfile::tempdir().unwrap();
    let app = common::build_test_app_in(pool, uploads.path());

    let id = submit_request(app.clone(), &client_token).await;
    let uri = format!("/api/v1/maintenance/{id}/attachments");

    for token in [&other_token, &builder_token] {
        let response =
            post_multipart_auth(app.clone(), &uri, token, "crack.jpg", b"jpeg", &[]).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    let response =
        post_multipart_auth(app.clone(), &uri, &client_token, "crack.exe", b"MZ", &[]).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(common::count_files(uploads.path()), 0);

    let response = post_multipart_auth(
        app.clone(),
        &uri,
        &client_token,
        "Crack.JPG",
        b"jpeg-bytes",
        &[("description", "Taken from inside")],
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let document = body_json(response).await["data"].clone();
    assert_eq!(document["document_type"], "MaintenanceAttachment");
    assert_eq!(document["name"], "Crack.JPG");
    assert_eq!(document["file_type"], ".jpg");
    assert_eq!(document["file_size"], 10);
    assert_eq!(document["description"], "Taken from inside");
    assert_eq!(document["maintenance_request_id"].to_string(), id);
    assert_eq!(document["uploaded_by_id"], client.id);
    let file_path = document["file_path"].as_str().unwrap();
    assert!(file_path.starts_with("maintenance/"));
    assert_eq!(std::fs::read(uploads.path().join(file_path)).unwrap(), b"jpeg-bytes");
    assert_eq!(common::count_files(&uploads.path().join("maintenance")), 1);

    // Staff add photos too; the detail lists both.
    let response =
        post_multipart_auth(app.clone(), &uri, &pm_token, "site.png", b"png", &[]).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(get_auth(app, &format!("/api/v1/maintenance/{id}"), &client_token).await).await;
    assert_eq!(json["data"]["attachments"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn status_change_records_history(pool: PgPool) {
    let (_pm, pm_token) = user_with_token(&pool, "pm@example.com", "ProjectManager").await;
    let (_client, client_token) = user_with_token(&pool, "client@example.com", "Client").await;
    let app = common::build_test_app(pool);

    let id = submit_request(app.clone(), &client_token).await;
    let uri = format!("/api/v1/maintenance/{id}/status");

    let response =
        post_json_auth(app.clone(), &uri, &client_token, serde_json::json!({ "status": "Completed" })).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = serde_json::json!({ "status": "Completed", "notes": "Glass replaced" });
    let response = post_json_auth(app.clone(), &uri, &pm_token, body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let request = body_json(response).await["data"].clone();
    assert_eq!(request["status"], "Completed");
    assert!(request["completed_at"].is_string());

    let json = body_json(get_auth(app, &format!("/api/v1/maintenance/{id}"), &client_token).await).await;
    let updates = json["data"]["updates"].as_array().unwrap();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0]["description"], "Glass replaced");
    assert_eq!(updates[0]["status_change"], "Pending → Completed");
}
