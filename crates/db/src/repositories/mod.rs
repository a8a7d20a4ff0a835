//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Listing methods that depend
//! on who is asking take the viewer's id and role and push the filter into
//! SQL.

pub mod analysis_repo;
pub mod audit_repo;
pub mod dashboard_repo;
pub mod document_repo;
pub mod invoice_repo;
pub mod maintenance_repo;
pub mod message_repo;
pub mod notification_repo;
pub mod project_repo;
pub mod quotation_repo;
pub mod session_repo;
pub mod task_repo;
pub mod user_repo;

pub use analysis_repo::AnalysisRepo;
pub use audit_repo::AuditLogRepo;
pub use dashboard_repo::DashboardRepo;
pub use document_repo::DocumentRepo;
pub use invoice_repo::InvoiceRepo;
pub use maintenance_repo::MaintenanceRepo;
pub use message_repo::MessageRepo;
pub use notification_repo::NotificationRepo;
pub use project_repo::{ProjectContractorRepo, ProjectPhaseRepo, ProjectRepo};
pub use quotation_repo::QuotationRepo;
pub use session_repo::SessionRepo;
pub use task_repo::TaskRepo;
pub use user_repo::UserRepo;
