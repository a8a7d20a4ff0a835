//! Repository for `messages` and `message_attachments`.

use buildwise_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::message::{
    ConversationSummary, CreateMessage, CreateMessageAttachment, Message, MessageAttachment,
    MessageView,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, subject, content, sender_id, recipient_id, project_id, \
                       maintenance_request_id, task_id, message_type, is_read, read_at, created_at";

/// Message columns joined with both participants' names; `s` and `r` alias `users`.
const VIEW_SELECT: &str = "SELECT m.id, m.subject, m.content,
            m.sender_id, s.first_name || ' ' || s.last_name AS sender_name,
            m.recipient_id, r.first_name || ' ' || r.last_name AS recipient_name,
            m.project_id, m.maintenance_request_id, m.task_id, m.message_type,
            m.is_read, m.read_at, m.created_at
       FROM messages m
       JOIN users s ON s.id = m.sender_id
       JOIN users r ON r.id = m.recipient_id";

const ATTACHMENT_COLUMNS: &str =
    "id, message_id, file_name, file_path, file_type, file_size, created_at";

/// Provides CRUD operations for messages.
pub struct MessageRepo;

impl MessageRepo {
    pub async fn create(pool: &PgPool, input: &CreateMessage) -> Result<Message, sqlx::Error> {
        let query = format!(
            "INSERT INTO messages
                (subject, content, sender_id, recipient_id, project_id,
                 maintenance_request_id, task_id, message_type)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Message>(&query)
            .bind(&input.subject)
            .bind(&input.content)
            .bind(input.sender_id)
            .bind(input.recipient_id)
            .bind(input.project_id)
            .bind(input.maintenance_request_id)
            .bind(input.task_id)
            .bind(&input.message_type)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Message>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM messages WHERE id = $1");
        sqlx::query_as::<_, Message>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_view(pool: &PgPool, id: DbId) -> Result<Option<MessageView>, sqlx::Error> {
        let query = format!("{VIEW_SELECT} WHERE m.id = $1");
        sqlx::query_as::<_, MessageView>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Messages received by `user_id`, newest first.
    pub async fn inbox(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MessageView>, sqlx::Error> {
        let query = format!(
            "{VIEW_SELECT} WHERE m.recipient_id = $1
             ORDER BY m.created_at DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, MessageView>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Messages sent by `user_id`, newest first.
    pub async fn sent(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MessageView>, sqlx::Error> {
        let query = format!(
            "{VIEW_SELECT} WHERE m.sender_id = $1
             ORDER BY m.created_at DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, MessageView>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Mark a message read. Returns the read time, or `None` when it was
    /// already read.
    pub async fn mark_read(pool: &PgPool, id: DbId) -> Result<Option<Timestamp>, sqlx::Error> {
        sqlx::query_scalar::<_, Option<Timestamp>>(
            "UPDATE messages SET is_read = true, read_at = NOW()
             WHERE id = $1 AND is_read = false
             RETURNING read_at",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map(Option::flatten)
    }

    /// Mark every unread message from `partner_id` to `user_id` read.
    pub async fn mark_conversation_read(
        pool: &PgPool,
        user_id: DbId,
        partner_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE messages SET is_read = true, read_at = NOW()
             WHERE recipient_id = $1 AND sender_id = $2 AND is_read = false",
        )
        .bind(user_id)
        .bind(partner_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM messages WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn unread_count(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM messages WHERE recipient_id = $1 AND is_read = false",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// One row per conversation partner with the latest message exchanged,
    /// most recent conversation first.
    pub async fn conversations(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<ConversationSummary>, sqlx::Error> {
        sqlx::query_as::<_, ConversationSummary>(
            "WITH exchanged AS (
                 SELECT m.*,
                        CASE WHEN m.sender_id = $1 THEN m.recipient_id ELSE m.sender_id END
                            AS partner_id
                   FROM messages m
                  WHERE m.sender_id = $1 OR m.recipient_id = $1
             ),
             latest AS (
                 SELECT DISTINCT ON (partner_id) *
                   FROM exchanged
                  ORDER BY partner_id, created_at DESC, id DESC
             )
             SELECT l.partner_id,
                    u.first_name || ' ' || u.last_name AS partner_name,
                    u.role AS partner_role,
                    l.id AS last_message_id,
                    l.subject AS last_subject,
                    l.content AS last_content,
                    l.created_at AS last_message_at,
                    (SELECT COUNT(*) FROM messages x
                      WHERE x.sender_id = l.partner_id
                        AND x.recipient_id = $1
                        AND x.is_read = false) AS unread_count
               FROM latest l
               JOIN users u ON u.id = l.partner_id
              ORDER BY l.created_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Every message exchanged between the two users, oldest first.
    pub async fn conversation_with(
        pool: &PgPool,
        user_id: DbId,
        partner_id: DbId,
    ) -> Result<Vec<MessageView>, sqlx::Error> {
        let query = format!(
            "{VIEW_SELECT}
             WHERE (m.sender_id = $1 AND m.recipient_id = $2)
                OR (m.sender_id = $2 AND m.recipient_id = $1)
             ORDER BY m.created_at ASC, m.id ASC"
        );
        sqlx::query_as::<_, MessageView>(&query)
            .bind(user_id)
            .bind(partner_id)
            .fetch_all(pool)
            .await
    }

    pub async fn add_attachment(
        pool: &PgPool,
        input: &CreateMessageAttachment,
    ) -> Result<MessageAttachment, sqlx::Error> {
        let query = format!(
            "INSERT INTO message_attachments (message_id, file_name, file_path, file_type, file_size)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {ATTACHMENT_COLUMNS}"
        );
        sqlx::query_as::<_, MessageAttachment>(&query)
            .bind(input.message_id)
            .bind(&input.file_name)
            .bind(&input.file_path)
            .bind(&input.file_type)
            .bind(input.file_size)
            .fetch_one(pool)
            .await
    }

    pub async fn find_attachment(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<MessageAttachment>, sqlx::Error> {
        let query = format!("SELECT {ATTACHMENT_COLUMNS} FROM message_attachments WHERE id = $1");
        sqlx::query_as::<_, MessageAttachment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_attachments(
        pool: &PgPool,
        message_id: DbId,
    ) -> Result<Vec<MessageAttachment>, sqlx::Error> {
        let query = format!(
            "SELECT {ATTACHMENT_COLUMNS} FROM message_attachments
             WHERE message_id = $1
             ORDER BY id"
        );
        sqlx::query_as::<_, MessageAttachment>(&query)
            .bind(message_id)
            .fetch_all(pool)
            .await
    }
}
