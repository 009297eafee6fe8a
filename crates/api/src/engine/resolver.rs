//! Destination configuration lookup port.
//!
//! Dispatch resolves its target through this trait instead of reading
//! the table directly, so tests can substitute a fake resolver and the
//! configuration store stays swappable.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;

use relay_core::error::CoreError;
use relay_core::kind::Kind;
use relay_core::types::DbId;
use relay_db::repositories::DestinationRepo;

/// A destination ready for an outbound call.
#[derive(Debug, Clone)]
pub struct ResolvedDestination {
    pub id: DbId,
    pub url: String,
    /// Extra request headers as a JSON object of string values.
    pub headers: serde_json::Value,
    /// Hard timeout for the outbound call.
    pub timeout: Duration,
}

/// Capability: `resolve(kind) -> {url, headers, timeout}` plus the
/// last-used bookkeeping side effect.
#[async_trait]
pub trait DestinationResolver: Send + Sync {
    /// Look up the enabled destination for a kind, if any.
    async fn resolve(&self, kind: Kind) -> Result<Option<ResolvedDestination>, CoreError>;

    /// Record that a dispatch used this destination.
    async fn mark_used(&self, id: DbId) -> Result<(), CoreError>;
}

/// Production resolver backed by the `webhook_destinations` table.
pub struct PgDestinationResolver {
    pool: PgPool,
}

impl PgDestinationResolver {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DestinationResolver for PgDestinationResolver {
    async fn resolve(&self, kind: Kind) -> Result<Option<ResolvedDestination>, CoreError> {
        let row = DestinationRepo::resolve(&self.pool, kind)
            .await
            .map_err(|e| CoreError::Internal(format!("destination lookup failed: {e}")))?;

        Ok(row.map(|dest| ResolvedDestination {
            id: dest.id,
            url: dest.url,
            headers: dest.headers,
            timeout: Duration::from_secs(dest.timeout_secs.max(1) as u64),
        }))
    }

    async fn mark_used(&self, id: DbId) -> Result<(), CoreError> {
        DestinationRepo::touch_last_used(&self.pool, id)
            .await
            .map_err(|e| CoreError::Internal(format!("destination bookkeeping failed: {e}")))
    }
}
