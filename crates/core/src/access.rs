//! Row-level access policy.
//!
//! Handlers fetch the row first and then ask one of these predicates whether
//! the caller may see or change it. Role-only gates (e.g. "staff only") live
//! in the API's RBAC extractors; the rules here combine role with ownership.

use crate::roles::{is_staff, ROLE_ADMIN, ROLE_CLIENT, ROLE_PROJECT_MANAGER};
use crate::types::DbId;

/// The authenticated caller as seen by the policy functions.
#[derive(Debug, Clone, Copy)]
pub struct Viewer<'a> {
    pub user_id: DbId,
    pub role: &'a str,
}

impl<'a> Viewer<'a> {
    pub fn new(user_id: DbId, role: &'a str) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }

    pub fn is_staff(&self) -> bool {
        is_staff(self.role)
    }

    fn is(&self, id: Option<DbId>) -> bool {
        id == Some(self.user_id)
    }
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

/// Admin, the managing PM, the client, or any actively assigned contractor.
pub fn can_view_project(
    viewer: Viewer<'_>,
    project_manager_id: Option<DbId>,
    client_id: Option<DbId>,
    contractor_ids: &[DbId],
) -> bool {
    viewer.is_admin()
        || viewer.is(project_manager_id)
        || viewer.is(client_id)
        || contractor_ids.contains(&viewer.user_id)
}

/// Admin, or the project manager assigned to this project.
pub fn can_manage_project(viewer: Viewer<'_>, project_manager_id: Option<DbId>) -> bool {
    viewer.is_admin() || (viewer.role == ROLE_PROJECT_MANAGER && viewer.is(project_manager_id))
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

pub fn can_view_task(viewer: Viewer<'_>, assigned_to_id: DbId, created_by_id: DbId) -> bool {
    viewer.is_staff() || viewer.user_id == assigned_to_id || viewer.user_id == created_by_id
}

pub fn can_update_task(viewer: Viewer<'_>, assigned_to_id: DbId) -> bool {
    viewer.is_staff() || viewer.user_id == assigned_to_id
}

// ---------------------------------------------------------------------------
// Maintenance requests
// ---------------------------------------------------------------------------

pub fn can_view_maintenance(
    viewer: Viewer<'_>,
    client_id: DbId,
    assigned_to_id: Option<DbId>,
) -> bool {
    viewer.is_staff() || viewer.user_id == client_id || viewer.is(assigned_to_id)
}

pub fn can_update_maintenance(viewer: Viewer<'_>, assigned_to_id: Option<DbId>) -> bool {
    viewer.is_staff() || viewer.is(assigned_to_id)
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// The people connected to a document through its owning records.
///
/// `linked_party_ids` collects the project's PM and client, the task's
/// assignee and creator, and the maintenance request's client and assignee,
/// whichever of those links exist.
#[derive(Debug, Clone, Default)]
pub struct DocumentLinks {
    pub uploaded_by_id: DbId,
    pub linked_party_ids: Vec<DbId>,
}

pub fn can_view_document(viewer: Viewer<'_>, links: &DocumentLinks) -> bool {
    viewer.is_staff()
        || viewer.user_id == links.uploaded_by_id
        || links.linked_party_ids.contains(&viewer.user_id)
}

/// Admins delete anything; project managers only their own uploads.
pub fn can_delete_document(viewer: Viewer<'_>, uploaded_by_id: DbId) -> bool {
    viewer.is_admin()
        || (viewer.role == ROLE_PROJECT_MANAGER && viewer.user_id == uploaded_by_id)
}

// ---------------------------------------------------------------------------
// Messages, analyses, finance
// ---------------------------------------------------------------------------

pub fn can_view_message(viewer: Viewer<'_>, sender_id: DbId, recipient_id: DbId) -> bool {
    viewer.is_admin() || viewer.user_id == sender_id || viewer.user_id == recipient_id
}

pub fn can_view_analysis(viewer: Viewer<'_>, requested_by_id: DbId) -> bool {
    viewer.is_staff() || viewer.user_id == requested_by_id
}

/// Quotations and invoices: staff, or the client they are addressed to.
pub fn can_view_financial(viewer: Viewer<'_>, client_id: DbId) -> bool {
    viewer.is_staff() || viewer.user_id == client_id
}

/// Only the addressed client answers a quotation on their own behalf.
pub fn can_respond_to_quotation(viewer: Viewer<'_>, client_id: DbId) -> bool {
    viewer.role == ROLE_CLIENT && viewer.user_id == client_id
}
