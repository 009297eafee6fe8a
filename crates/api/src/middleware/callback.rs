//! Shared-secret authentication for the callback ingress.
//!
//! The external workflow system authenticates with a static secret in
//! the `x-relay-callback-secret` header, entirely separate from end-user
//! sessions. Secrets are compared by SHA-256 digest so the comparison
//! does not leak prefix length.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use sha2::{Digest, Sha256};

use relay_core::error::CoreError;

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the callback shared secret.
pub const CALLBACK_SECRET_HEADER: &str = "x-relay-callback-secret";

/// Proof that the request presented the configured callback secret.
pub struct CallbackAuth;

impl FromRequestParts<AppState> for CallbackAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(CALLBACK_SECRET_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(format!(
                    "Missing {CALLBACK_SECRET_HEADER} header"
                )))
            })?;

        if digest(presented) != digest(&state.config.callback_secret) {
            return Err(AppError::Core(CoreError::Unauthorized(
                "Invalid callback secret".into(),
            )));
        }

        Ok(CallbackAuth)
    }
}

/// SHA-256 digest of a secret string.
fn digest(secret: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.finalize().into()
}
