//! Route definitions for admin destination management.
//!
//! All endpoints require the admin role.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::destinations;
use crate::state::AppState;

/// Routes mounted at `/admin/destinations`.
///
/// ```text
/// GET    /                -> list_destinations
/// POST   /                -> create_destination
/// PUT    /{id}            -> update_destination
/// DELETE /{id}            -> delete_destination
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(destinations::list_destinations).post(destinations::create_destination),
        )
        .route(
            "/{id}",
            put(destinations::update_destination).delete(destinations::delete_destination),
        )
}
