//! Request extractors for authentication, role checks and client metadata.
//!
//! - [`auth::AuthUser`] -- the caller, from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- `Admin` only.
//! - [`rbac::RequireStaff`] -- `Admin` or `ProjectManager`.
//! - [`rbac::RequireUploader`] -- staff or `Contractor`.
//! - [`rbac::RequireClient`] / [`rbac::RequireContractor`] -- exactly that role.
//! - [`client::ClientInfo`] -- IP address and user agent for audit rows.

pub mod auth;
pub mod client;
pub mod rbac;
