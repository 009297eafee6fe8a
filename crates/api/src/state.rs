use std::sync::Arc;

use crate::config::ServerConfig;
use crate::engine::WebhookDispatcher;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: relay_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Outbound webhook dispatcher.
    pub dispatcher: Arc<WebhookDispatcher>,
}
