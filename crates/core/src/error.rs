use crate::types::DbId;

/// Domain-level error taxonomy shared by the service and the client.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// No enabled webhook destination exists for the requested kind.
    #[error("No enabled destination configured for kind '{0}'")]
    Configuration(String),

    /// The external workflow system returned a non-success response.
    #[error("Upstream returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    /// An outbound call or polling loop exceeded its deadline.
    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
