use std::sync::Arc;

use buildwise_llm::CompletionProvider;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: buildwise_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Chat-completion backend for the analysis endpoints.
    pub llm: Arc<dyn CompletionProvider>,
}
