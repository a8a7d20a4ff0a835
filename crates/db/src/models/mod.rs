//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A create DTO for inserts
//! - An update DTO (all `Option` fields) where the entity is editable

pub mod analysis;
pub mod audit;
pub mod dashboard;
pub mod document;
pub mod invoice;
pub mod maintenance;
pub mod message;
pub mod notification;
pub mod project;
pub mod quotation;
pub mod session;
pub mod task;
pub mod user;
