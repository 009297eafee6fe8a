pub mod callbacks;
pub mod destinations;
pub mod dispatch;
pub mod health;
pub mod jobs;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /dispatch                        dispatch ingress (POST, user session)
/// /callbacks                       callback ingress (POST, shared secret)
///
/// /jobs                            list own jobs (admins: all)
/// /jobs/{id}                       job status read (owner or admin)
///
/// /admin/destinations              list, create (admin only)
/// /admin/destinations/{id}         update, delete (admin only)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/dispatch", dispatch::router())
        .nest("/callbacks", callbacks::router())
        .nest("/jobs", jobs::router())
        .nest("/admin/destinations", destinations::router())
}
