//! Repository for the `notifications` table.

use buildwise_core::status;
use buildwise_core::types::DbId;
use sqlx::PgPool;

use crate::models::notification::{CreateNotification, Notification};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, message, notification_type, recipient_id, status, \
                       project_id, maintenance_request_id, task_id, is_read, read_at, \
                       sent_at, delivered_at, error_message, created_at";

/// Provides CRUD operations for in-app notifications.
pub struct NotificationRepo;

impl NotificationRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateNotification,
    ) -> Result<Notification, sqlx::Error> {
        let query = format!(
            "INSERT INTO notifications
                (title, message, notification_type, recipient_id, status,
                 project_id, maintenance_request_id, task_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(&input.title)
            .bind(&input.message)
            .bind(&input.notification_type)
            .bind(input.recipient_id)
            .bind(&input.status)
            .bind(input.project_id)
            .bind(input.maintenance_request_id)
            .bind(input.task_id)
            .fetch_one(pool)
            .await
    }

    /// A user's notifications, newest first. `unread_only` hides read rows.
    pub async fn list_for_user(
        pool: &PgPool,
        recipient_id: DbId,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notifications
             WHERE recipient_id = $1 AND ($2 = false OR is_read = false)
             ORDER BY created_at DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(recipient_id)
            .bind(unread_only)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Mark one of the recipient's notifications read and delivered.
    /// Returns `None` when it does not exist or belongs to someone else.
    pub async fn mark_read(
        pool: &PgPool,
        id: DbId,
        recipient_id: DbId,
    ) -> Result<Option<Notification>, sqlx::Error> {
        let query = format!(
            "UPDATE notifications SET
                is_read = true,
                read_at = COALESCE(read_at, NOW()),
                status = $3,
                delivered_at = COALESCE(delivered_at, NOW())
             WHERE id = $1 AND recipient_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(id)
            .bind(recipient_id)
            .bind(status::NOTIFICATION_DELIVERED)
            .fetch_optional(pool)
            .await
    }

    /// Mark all of a user's unread notifications read. Returns how many changed.
    pub async fn mark_all_read(pool: &PgPool, recipient_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications SET
                is_read = true,
                read_at = NOW(),
                status = $2,
                delivered_at = COALESCE(delivered_at, NOW())
             WHERE recipient_id = $1 AND is_read = false",
        )
        .bind(recipient_id)
        .bind(status::NOTIFICATION_DELIVERED)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn unread_count(pool: &PgPool, recipient_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = $1 AND is_read = false",
        )
        .bind(recipient_id)
        .fetch_one(pool)
        .await
    }
}
