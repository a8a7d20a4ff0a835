//! Integration tests for messages, attachments and notifications.

mod common;

use axum::http::StatusCode;
use common::{
    body_bytes, body_json, delete_auth, get_auth, post_json_auth, post_multipart_auth,
    user_with_token,
};
use sqlx::PgPool;

async fn send_message(
    pool: &PgPool,
    token: &str,
    recipient_id: i64,
    subject: &str,
) -> serde_json::Value {
    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({
        "recipient_id": recipient_id,
        "subject": subject,
        "content": "Please confirm the delivery date for the roof trusses.",
    });
    let response = post_json_auth(app, "/api/v1/messages", token, body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn compose_notifies_and_opening_marks_read(pool: PgPool) {
    let (pm, pm_token) = user_with_token(&pool, "pm@example.com", "ProjectManager").await;
    let (client, client_token) = user_with_token(&pool, "client@example.com", "Client").await;

    let message = send_message(&pool, &pm_token, client.id, "Roof trusses").await;
    assert_eq!(message["sender_id"], pm.id);
    assert_eq!(message["message_type"], "General");
    assert_eq!(message["is_read"], false);

    // Recipient got a notification and an unread message.
    let app = common::build_test_app(pool.clone());
    let json = body_json(get_auth(app, "/api/v1/notifications", &client_token).await).await;
    assert_eq!(json["data"][0]["title"], "New Message");
    assert_eq!(
        json["data"][0]["message"],
        "You have received a new message from ProjectManager Tester: Roof trusses"
    );

    let app = common::build_test_app(pool.clone());
    let json = body_json(get_auth(app, "/api/v1/messages/inbox", &client_token).await).await;
    assert_eq!(json["data"]["unread_count"], 1);
    assert_eq!(json["data"]["messages"][0]["sender_name"], "ProjectManager Tester");

    // The sender opening it does not mark it read.
    let uri = format!("/api/v1/messages/{}", message["id"]);
    let app = common::build_test_app(pool.clone());
    let json = body_json(get_auth(app, &uri, &pm_token).await).await;
    assert_eq!(json["data"]["is_read"], false);

    // The recipient opening it does.
    let app = common::build_test_app(pool.clone());
    let json = body_json(get_auth(app, &uri, &client_token).await).await;
    assert_eq!(json["data"]["is_read"], true);
    assert!(json["data"]["read_at"].is_string());

    let app = common::build_test_app(pool);
    let json = body_json(get_auth(app, "/api/v1/messages/unread-count", &client_token).await).await;
    assert_eq!(json["data"]["count"], 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn outsiders_cannot_read_messages(pool: PgPool) {
    let (_pm, pm_token) = user_with_token(&pool, "pm@example.com", "ProjectManager").await;
    let (client, _) = user_with_token(&pool, "client@example.com", "Client").await;
    let (_snoop, snoop_token) = user_with_token(&pool, "snoop@example.com", "Contractor").await;
    let (_admin, admin_token) = user_with_token(&pool, "admin@example.com", "Admin").await;

    let message = send_message(&pool, &pm_token, client.id, "Private").await;
    let uri = format!("/api/v1/messages/{}", message["id"]);

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, &uri, &snoop_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool);
    let response = get_auth(app, &uri, &admin_token).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn reply_goes_to_other_party_with_single_prefix(pool: PgPool) {
    let (pm, pm_token) = user_with_token(&pool, "pm@example.com", "ProjectManager").await;
    let (client, client_token) = user_with_token(&pool, "client@example.com", "Client").await;

    let message = send_message(&pool, &pm_token, client.id, "Site visit").await;

    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/messages/{}/reply", message["id"]);
    let body = serde_json::json!({ "content": "Tuesday works." });
    let response = post_json_auth(app, &uri, &client_token, body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let reply = body_json(response).await["data"].clone();
    assert_eq!(reply["subject"], "Re: Site visit");
    assert_eq!(reply["recipient_id"], pm.id);

    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/messages/{}/reply", reply["id"]);
    let body = serde_json::json!({ "content": "See you then." });
    let response = post_json_auth(app, &uri, &pm_token, body).await;
    let second = body_json(response).await["data"].clone();
    assert_eq!(second["subject"], "Re: Site visit");
    assert_eq!(second["recipient_id"], client.id);

    // Conversations list one partner with the thread in order.
    let app = common::build_test_app(pool.clone());
    let json = body_json(get_auth(app, "/api/v1/messages/conversations", &client_token).await).await;
    let conversations = json["data"].as_array().unwrap();
    assert_eq!(conversations.len(), 1);
    assert_eq!(conversations[0]["partner_id"], pm.id);

    let app = common::build_test_app(pool);
    let uri = format!("/api/v1/messages/conversations/{}", pm.id);
    let json = body_json(get_auth(app, &uri, &client_token).await).await;
    let thread = json["data"].as_array().unwrap();
    assert_eq!(thread.len(), 3);
    assert_eq!(thread[0]["subject"], "Site visit");
    assert!(thread.iter().filter(|m| m["recipient_id"] == client.id).all(|m| m["is_read"] == true));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn quick_message_and_validation(pool: PgPool) {
    let (_pm, pm_token) = user_with_token(&pool, "pm@example.com", "ProjectManager").await;
    let (client, client_token) = user_with_token(&pool, "client@example.com", "Client").await;

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "recipient_id": client.id, "content": "On my way" });
    let response = post_json_auth(app, "/api/v1/messages/quick", &pm_token, body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["data"]["subject"], "Quick Message");

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "recipient_id": client.id, "subject": "  ", "content": "x" });
    let response = post_json_auth(app, "/api/v1/messages", &pm_token, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "recipient_id": 999999, "subject": "Hi", "content": "x" });
    let response = post_json_auth(app, "/api/v1/messages", &pm_token, body).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let app = common::build_test_app(pool);
    let json = body_json(get_auth(app, "/api/v1/messages/sent", &client_token).await).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn attachments_upload_download_and_delete(pool: PgPool) {
    let (_pm, pm_token) = user_with_token(&pool, "pm@example.com", "ProjectManager").await;
    let (client, client_token) = user_with_token(&pool, "client@example.com", "Client").await;
    let (_snoop, snoop_token) = user_with_token(&pool, "snoop@example.com", "Contractor").await;

    let message = send_message(&pool, &pm_token, client.id, "Drawings").await;
    let uri = format!("/api/v1/messages/{}/attachments", message["id"]);

    // One router for the whole test so uploads land in a single directory.
    let app = common::build_test_app(pool);

    // Only the sender may attach.
    let response =
        post_multipart_auth(app.clone(), &uri, &client_token, "plan.pdf", b"%PDF-1.4 plan", &[])
            .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_multipart_auth(app.clone(), &uri, &pm_token, "setup.exe", b"MZ", &[]).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response =
        post_multipart_auth(app.clone(), &uri, &pm_token, "Plan.PDF", b"%PDF-1.4 plan", &[]).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let attachment = body_json(response).await["data"].clone();
    assert_eq!(attachment["file_type"], ".pdf");
    assert_eq!(attachment["file_size"], 13);

    let message_uri = format!("/api/v1/messages/{}", message["id"]);
    let json = body_json(get_auth(app.clone(), &message_uri, &client_token).await).await;
    assert_eq!(json["data"]["attachments"].as_array().unwrap().len(), 1);

    let download = format!("/api/v1/messages/attachments/{}/download", attachment["id"]);
    let response = get_auth(app.clone(), &download, &snoop_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get_auth(app.clone(), &download, &client_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response.headers()["content-disposition"].to_str().unwrap().to_string();
    assert!(disposition.contains("Plan.PDF"));
    assert_eq!(body_bytes(response).await, b"%PDF-1.4 plan".to_vec());

    // Non-parties cannot delete; the recipient can, taking the attachments with it.
    let response = delete_auth(app.clone(), &message_uri, &snoop_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete_auth(app.clone(), &message_uri, &client_token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(app, &download, &client_token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn notifications_mark_read_and_read_all(pool: PgPool) {
    let (_pm, pm_token) = user_with_token(&pool, "pm@example.com", "ProjectManager").await;
    let (client, client_token) = user_with_token(&pool, "client@example.com", "Client").await;

    send_message(&pool, &pm_token, client.id, "One").await;
    send_message(&pool, &pm_token, client.id, "Two").await;
    send_message(&pool, &pm_token, client.id, "Three").await;

    let app = common::build_test_app(pool.clone());
    let json = body_json(get_auth(app, "/api/v1/notifications", &client_token).await).await;
    let first_id = json["data"][0]["id"].as_i64().unwrap();

    // Someone else's notification looks missing.
    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/notifications/{first_id}/read");
    let response = post_json_auth(app, &uri, &pm_token, serde_json::json!({})).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, &uri, &client_token, serde_json::json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["is_read"], true);

    let app = common::build_test_app(pool.clone());
    let json = body_json(get_auth(app, "/api/v1/notifications?unread_only=true", &client_token).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, "/api/v1/notifications/read-all", &client_token, serde_json::json!({})).await;
    assert_eq!(body_json(response).await["data"]["count"], 2);

    let app = common::build_test_app(pool);
    let json = body_json(get_auth(app, "/api/v1/notifications/unread-count", &client_token).await).await;
    assert_eq!(json["data"]["count"], 0);
}
