//! Route definition for the dispatch ingress.

use axum::routing::post;
use axum::Router;

use crate::handlers::dispatch;
use crate::state::AppState;

/// Routes mounted at `/dispatch`.
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(dispatch::dispatch))
}
