//! In-app notification fan-out.
//!
//! Notifications are side effects of another change (a new message, a task
//! assignment); failing to queue one is logged and never fails the request.

use buildwise_core::roles::ROLE_PROJECT_MANAGER;
use buildwise_db::models::notification::CreateNotification;
use buildwise_db::repositories::{NotificationRepo, UserRepo};
use buildwise_db::DbPool;

/// Queue one notification.
pub async fn notify(pool: &DbPool, notification: CreateNotification) {
    if let Err(e) = NotificationRepo::create(pool, &notification).await {
        tracing::error!(
            error = %e,
            recipient_id = notification.recipient_id,
            title = %notification.title,
            "Failed to queue notification"
        );
    }
}

/// Queue a copy of `template` for every active project manager.
pub async fn notify_project_managers(pool: &DbPool, template: CreateNotification) {
    let managers = match UserRepo::active_ids_by_role(pool, ROLE_PROJECT_MANAGER).await {
        Ok(ids) => ids,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load project managers for notification");
            return;
        }
    };
    tracing::debug!(count = managers.len(), title = %template.title, "Notifying project managers");
    for recipient_id in managers {
        notify(
            pool,
            CreateNotification {
                recipient_id,
                ..template.clone()
            },
        )
        .await;
    }
}
