//! Webhook destination configuration models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use relay_core::kind::Kind;
use relay_core::types::{DbId, Timestamp};

/// A row from the `webhook_destinations` table.
///
/// At most one enabled destination exists per kind (enforced by a
/// partial unique index).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WebhookDestination {
    pub id: DbId,
    pub kind: String,
    pub url: String,
    /// Extra request headers as a JSON object of string values.
    pub headers: serde_json::Value,
    /// Hard timeout for a single outbound call, in seconds.
    pub timeout_secs: i32,
    pub is_enabled: bool,
    pub created_by: DbId,
    pub last_used_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a destination via the admin API.
#[derive(Debug, Deserialize)]
pub struct CreateDestination {
    pub kind: Kind,
    pub url: String,
    pub headers: Option<serde_json::Value>,
    pub timeout_secs: Option<i32>,
    pub is_enabled: Option<bool>,
}

/// DTO for updating a destination via the admin API.
#[derive(Debug, Deserialize)]
pub struct UpdateDestination {
    pub url: Option<String>,
    pub headers: Option<serde_json::Value>,
    pub timeout_secs: Option<i32>,
    pub is_enabled: Option<bool>,
}
