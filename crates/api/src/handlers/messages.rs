//! Handlers for the `/messages` resource: inbox, sent items, conversations,
//! replies and attachments.
//!
//! Every new message queues a "New Message" notification for its recipient.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use buildwise_core::access::can_view_message;
use buildwise_core::audit::{actions, entities};
use buildwise_core::messaging::{new_message_notice, reply_recipient, reply_subject, QUICK_MESSAGE_SUBJECT};
use buildwise_core::status::{validate_one_of, MESSAGE_GENERAL, MESSAGE_TYPES};
use buildwise_core::types::DbId;
use buildwise_core::uploads::{validate_document_extension, MESSAGES_DIR};
use buildwise_core::validation::{
    check_required_len, MAX_MESSAGE_CONTENT_LEN, MAX_SUBJECT_LEN,
};
use buildwise_db::models::message::{
    ConversationSummary, CreateMessage, CreateMessageAttachment, Message, MessageAttachment,
    MessageView,
};
use buildwise_db::models::notification::CreateNotification;
use buildwise_db::models::user::User;
use buildwise_db::repositories::{MessageRepo, UserRepo};
use serde::{Deserialize, Serialize};

use super::{forbidden, invalid, not_found, validate};
use crate::audit::AuditEvent;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::client::ClientInfo;
use crate::notifications::notify;
use crate::query::PaginationParams;
use crate::response::{CountResponse, DataResponse};
use crate::state::AppState;
use crate::storage::{
    discard_upload, download_response, read_multipart, remove_upload, save_upload,
};

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /messages`.
#[derive(Debug, Deserialize)]
pub struct ComposeRequest {
    pub recipient_id: DbId,
    pub subject: String,
    pub content: String,
    pub message_type: Option<String>,
    pub project_id: Option<DbId>,
    pub maintenance_request_id: Option<DbId>,
    pub task_id: Option<DbId>,
}

/// Request body for `POST /messages/{id}/reply`.
#[derive(Debug, Deserialize)]
pub struct ReplyRequest {
    pub content: String,
}

/// Request body for `POST /messages/quick`.
#[derive(Debug, Deserialize)]
pub struct QuickMessageRequest {
    pub recipient_id: DbId,
    pub content: String,
}

/// Inbox page plus the caller's total unread count.
#[derive(Debug, Serialize)]
pub struct InboxResponse {
    pub messages: Vec<MessageView>,
    pub unread_count: i64,
}

/// A message with its attachments.
#[derive(Debug, Serialize)]
pub struct MessageDetail {
    #[serde(flatten)]
    pub message: MessageView,
    pub attachments: Vec<MessageAttachment>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn load_user(state: &AppState, id: DbId) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("User", id))
}

async fn load_active_recipient(state: &AppState, id: DbId) -> AppResult<User> {
    let recipient = load_user(state, id).await?;
    if !recipient.is_active {
        return Err(AppError::BadRequest(format!(
            "User {id} is deactivated and cannot receive messages"
        )));
    }
    Ok(recipient)
}

async fn load_visible_message(state: &AppState, auth: &AuthUser, id: DbId) -> AppResult<Message> {
    let message = MessageRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Message", id))?;
    if !can_view_message(auth.viewer(), message.sender_id, message.recipient_id) {
        return Err(forbidden("You do not have access to this message"));
    }
    Ok(message)
}

fn validate_body(subject: &str, content: &str) -> AppResult<()> {
    validate(check_required_len("Subject", subject, MAX_SUBJECT_LEN))?;
    validate(check_required_len("Content", content, MAX_MESSAGE_CONTENT_LEN))
}

/// Insert the message and queue the recipient's notification.
async fn deliver(state: &AppState, sender: &User, input: CreateMessage) -> AppResult<Message> {
    let message = MessageRepo::create(&state.pool, &input).await?;
    tracing::debug!(
        message_id = message.id,
        sender_id = message.sender_id,
        recipient_id = message.recipient_id,
        "Message sent"
    );

    notify(
        &state.pool,
        CreateNotification::in_app(
            message.recipient_id,
            "New Message",
            new_message_notice(&sender.full_name(), &message.subject),
        ),
    )
    .await;

    Ok(message)
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// GET /api/v1/messages/inbox
pub async fn inbox(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<InboxResponse>>> {
    let messages =
        MessageRepo::inbox(&state.pool, auth.user_id, params.limit(), params.offset()).await?;
    let unread_count = MessageRepo::unread_count(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse {
        data: InboxResponse {
            messages,
            unread_count,
        },
    }))
}

/// GET /api/v1/messages/sent
pub async fn sent(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<MessageView>>>> {
    let messages =
        MessageRepo::sent(&state.pool, auth.user_id, params.limit(), params.offset()).await?;
    Ok(Json(DataResponse { data: messages }))
}

/// GET /api/v1/messages/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<CountResponse>>> {
    let count = MessageRepo::unread_count(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse {
        data: CountResponse { count },
    }))
}

/// GET /api/v1/messages/conversations
///
/// One row per conversation partner, most recent first.
pub async fn conversations(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<ConversationSummary>>>> {
    let conversations = MessageRepo::conversations(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse {
        data: conversations,
    }))
}

/// GET /api/v1/messages/conversations/{user_id}
///
/// The full thread with one partner, oldest first. Opening it marks the
/// partner's messages to the caller as read.
pub async fn conversation_with(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(partner_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<MessageView>>>> {
    load_user(&state, partner_id).await?;
    let marked = MessageRepo::mark_conversation_read(&state.pool, auth.user_id, partner_id).await?;
    tracing::debug!(user_id = auth.user_id, partner_id, marked, "Conversation opened");
    let messages = MessageRepo::conversation_with(&state.pool, auth.user_id, partner_id).await?;
    Ok(Json(DataResponse { data: messages }))
}

// ---------------------------------------------------------------------------
// Sending
// ---------------------------------------------------------------------------

/// POST /api/v1/messages
pub async fn compose(
    State(state): State<AppState>,
    auth: AuthUser,
    client: ClientInfo,
    Json(input): Json<ComposeRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Message>>)> {
    validate_body(&input.subject, &input.content)?;
    let message_type = input
        .message_type
        .unwrap_or_else(|| MESSAGE_GENERAL.to_string());
    validate(validate_one_of("message type", &message_type, MESSAGE_TYPES))?;

    load_active_recipient(&state, input.recipient_id).await?;
    let sender = load_user(&state, auth.user_id).await?;

    let message = deliver(
        &state,
        &sender,
        CreateMessage {
            subject: input.subject.trim().to_string(),
            content: input.content,
            sender_id: sender.id,
            recipient_id: input.recipient_id,
            project_id: input.project_id,
            maintenance_request_id: input.maintenance_request_id,
            task_id: input.task_id,
            message_type,
        },
    )
    .await?;

    AuditEvent::new(entities::MESSAGE, message.id, actions::CREATE)
        .by(auth.user_id)
        .client(&client)
        .after(&message)
        .record(&state.pool)
        .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: message })))
}

/// POST /api/v1/messages/quick
///
/// Short message with the fixed subject "Quick Message".
pub async fn quick_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<QuickMessageRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Message>>)> {
    validate_body(QUICK_MESSAGE_SUBJECT, &input.content)?;
    load_active_recipient(&state, input.recipient_id).await?;
    let sender = load_user(&state, auth.user_id).await?;

    let message = deliver(
        &state,
        &sender,
        CreateMessage {
            subject: QUICK_MESSAGE_SUBJECT.to_string(),
            content: input.content,
            sender_id: sender.id,
            recipient_id: input.recipient_id,
            project_id: None,
            maintenance_request_id: None,
            task_id: None,
            message_type: MESSAGE_GENERAL.to_string(),
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: message })))
}

/// POST /api/v1/messages/{id}/reply
///
/// The reply goes to the other party, keeps the original's links and type,
/// and carries a single `Re: ` prefix.
pub async fn reply(
    State(state): State<AppState>,
    auth: AuthUser,
    client: ClientInfo,
    Path(id): Path<DbId>,
    Json(input): Json<ReplyRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Message>>)> {
    let original = load_visible_message(&state, &auth, id).await?;
    let subject = reply_subject(&original.subject);
    validate_body(&subject, &input.content)?;

    let sender = load_user(&state, auth.user_id).await?;
    let recipient_id = reply_recipient(sender.id, original.sender_id, original.recipient_id);

    let message = deliver(
        &state,
        &sender,
        CreateMessage {
            subject,
            content: input.content,
            sender_id: sender.id,
            recipient_id,
            project_id: original.project_id,
            maintenance_request_id: original.maintenance_request_id,
            task_id: original.task_id,
            message_type: original.message_type,
        },
    )
    .await?;

    AuditEvent::new(entities::MESSAGE, message.id, actions::REPLY)
        .by(auth.user_id)
        .client(&client)
        .after(&message)
        .describe(format!("Reply to message {id}"))
        .record(&state.pool)
        .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: message })))
}

// ---------------------------------------------------------------------------
// Single message
// ---------------------------------------------------------------------------

/// GET /api/v1/messages/{id}
///
/// Opening an unread message as its recipient marks it read.
pub async fn get_message(
    State(state): State<AppState>,
    auth: AuthUser,
    client: ClientInfo,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<MessageDetail>>> {
    let mut view = MessageRepo::find_view(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Message", id))?;
    if !can_view_message(auth.viewer(), view.sender_id, view.recipient_id) {
        return Err(forbidden("You do not have access to this message"));
    }

    if view.recipient_id == auth.user_id && !view.is_read {
        if let Some(read_at) = MessageRepo::mark_read(&state.pool, id).await? {
            view.is_read = true;
            view.read_at = Some(read_at);
            AuditEvent::new(entities::MESSAGE, id, actions::READ)
                .by(auth.user_id)
                .client(&client)
                .record(&state.pool)
                .await;
        }
    }

    let attachments = MessageRepo::list_attachments(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: MessageDetail {
            message: view,
            attachments,
        },
    }))
}

/// DELETE /api/v1/messages/{id}
///
/// Either party (or an admin) may delete. Attachment files go with it.
pub async fn delete_message(
    State(state): State<AppState>,
    auth: AuthUser,
    client: ClientInfo,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let message = load_visible_message(&state, &auth, id).await?;
    let attachments = MessageRepo::list_attachments(&state.pool, id).await?;

    if !MessageRepo::delete(&state.pool, id).await? {
        return Err(not_found("Message", id));
    }
    for attachment in &attachments {
        remove_upload(&state.config.upload_dir, &attachment.file_path).await?;
    }

    AuditEvent::new(entities::MESSAGE, id, actions::DELETE)
        .by(auth.user_id)
        .client(&client)
        .before(&message)
        .record(&state.pool)
        .await;

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Attachments
// ---------------------------------------------------------------------------

/// POST /api/v1/messages/{id}/attachments
///
/// Only the sender attaches files to a message.
pub async fn upload_attachment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<MessageAttachment>>)> {
    let message = MessageRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Message", id))?;
    if message.sender_id != auth.user_id {
        return Err(forbidden("Only the sender can attach files to a message"));
    }

    let mut form = read_multipart(multipart).await?;
    let file = form.take_file()?;
    let file_type = validate_document_extension(&file.file_name).map_err(invalid)?;

    let stored = save_upload(&state.config.upload_dir, MESSAGES_DIR, &file).await?;
    let created = MessageRepo::add_attachment(
        &state.pool,
        &CreateMessageAttachment {
            message_id: id,
            file_name: file.file_name,
            file_path: stored.relative_path.clone(),
            file_type,
            file_size: stored.file_size,
        },
    )
    .await;
    let attachment = match created {
        Ok(attachment) => attachment,
        Err(e) => {
            discard_upload(&state.config.upload_dir, &stored.relative_path).await;
            return Err(e.into());
        }
    };

    Ok((StatusCode::CREATED, Json(DataResponse { data: attachment })))
}

/// GET /api/v1/messages/attachments/{id}/download
pub async fn download_attachment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Response> {
    let attachment = MessageRepo::find_attachment(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("MessageAttachment", id))?;
    load_visible_message(&state, &auth, attachment.message_id).await?;

    download_response(
        &state.config.upload_dir,
        &attachment.file_path,
        &attachment.file_name,
    )
    .await
}
