pub mod admin;
pub mod analyses;
pub mod auth;
pub mod dashboard;
pub mod documents;
pub mod health;
pub mod invoices;
pub mod maintenance;
pub mod messages;
pub mod notifications;
pub mod projects;
pub mod quotations;
pub mod tasks;
pub mod users;

use axum::extract::DefaultBodyLimit;
use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                                   register (public)
/// /auth/login                                      login (public)
/// /auth/refresh                                    refresh (public)
/// /auth/logout                                     logout (requires auth)
/// /auth/me                                         current user
///
/// /admin/users                                     list, create (admin only)
/// /admin/users/{id}                                get, update
/// /admin/users/{id}/deactivate                     deactivate (POST)
/// /admin/audit-logs                                query (?entity_type, user_id, from, to)
/// /admin/audit-logs/{entity_type}/{entity_id}      entity history
///
/// /users                                           directory (?role=)
///
/// /dashboard                                       role-filtered summary
///
/// /projects                                        list, create
/// /projects/{id}                                   get, update, delete
/// /projects/{id}/phases                            list, create
/// /projects/{id}/contractors                       assign (POST)
/// /projects/{id}/contractors/{contractor_id}       unassign (DELETE)
///
/// /tasks                                           list, create
/// /tasks/mine                                      assigned to caller
/// /tasks/{id}                                      get
/// /tasks/{id}/status                               status update (POST)
///
/// /maintenance                                     list, create
/// /maintenance/mine                                submitted by caller
/// /maintenance/{id}                                get, update
/// /maintenance/{id}/status                         status update (POST)
/// /maintenance/{id}/attachments                    upload (multipart)
///
/// /documents                                       list, upload (multipart)
/// /documents/{id}                                  get, delete
/// /documents/{id}/download                         download
///
/// /messages                                        compose (POST)
/// /messages/inbox                                  inbox + unread count
/// /messages/sent                                   sent items
/// /messages/unread-count                           unread count
/// /messages/conversations                          conversation partners
/// /messages/conversations/{user_id}                thread with one user
/// /messages/quick                                  quick message (POST)
/// /messages/attachments/{id}/download              download attachment
/// /messages/{id}                                   get, delete
/// /messages/{id}/reply                             reply (POST)
/// /messages/{id}/attachments                       upload (multipart)
///
/// /notifications                                   list (?unread_only, limit, offset)
/// /notifications/read-all                          mark all read (POST)
/// /notifications/unread-count                      unread count (GET)
/// /notifications/{id}/read                         mark read (POST)
///
/// /quotations                                      list, create
/// /quotations/{id}                                 get
/// /quotations/{id}/status                          status update (POST)
/// /quotations/{id}/invoice                         invoice from quotation (POST)
///
/// /invoices                                        list, create
/// /invoices/{id}                                   get
/// /invoices/{id}/status                            status update (POST)
/// /invoices/{id}/payments                          record payment (POST)
///
/// /analyses                                        list (?analysis_type, limit, offset)
/// /analyses/cost-estimation                        generate (POST)
/// /analyses/maintenance-prediction                 generate (POST)
/// /analyses/risk-analysis                          generate (POST)
/// /analyses/assist                                 unsaved prompt (POST)
/// /analyses/{id}                                   get
/// ```
///
/// `uploads` is layered onto the multipart routes only.
pub fn api_routes(uploads: DefaultBodyLimit) -> Router<AppState> {
    Router::new()
        // Authentication routes (register, login, refresh, logout, me).
        .nest("/auth", auth::router())
        // Admin routes (user management + audit trail).
        .nest("/admin", admin::router())
        // User directory for recipient pickers.
        .nest("/users", users::router())
        .nest("/dashboard", dashboard::router())
        .nest("/projects", projects::router())
        .nest("/tasks", tasks::router())
        .nest("/maintenance", maintenance::router(uploads))
        .nest("/documents", documents::router(uploads))
        .nest("/messages", messages::router(uploads))
        .nest("/notifications", notifications::router())
        // Commercial documents.
        .nest("/quotations", quotations::router())
        .nest("/invoices", invoices::router())
        // AI analyses.
        .nest("/analyses", analyses::router())
}
