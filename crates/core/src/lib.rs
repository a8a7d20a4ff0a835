//! Domain layer for the construction-management backend.
//!
//! Everything here is pure: no database, no HTTP, no filesystem. The `db`,
//! `llm` and `api` crates build on these types and rules.

pub mod access;
pub mod analysis;
pub mod audit;
pub mod dashboard;
pub mod error;
pub mod messaging;
pub mod money;
pub mod roles;
pub mod status;
pub mod types;
pub mod uploads;
pub mod validation;
