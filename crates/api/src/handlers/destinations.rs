//! Admin handlers for webhook destination management.
//!
//! All endpoints require the admin role via [`RequireAdmin`].

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use relay_core::error::CoreError;
use relay_core::types::DbId;
use relay_db::models::destination::{CreateDestination, UpdateDestination};
use relay_db::repositories::DestinationRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Default outbound call timeout when a destination does not set one.
const DEFAULT_TIMEOUT_SECS: i32 = 120;

/// Reject header maps containing non-string values up front, so a bad
/// configuration fails at creation time instead of on every dispatch.
fn validate_headers(headers: &serde_json::Value) -> Result<(), AppError> {
    match headers {
        serde_json::Value::Object(map) => {
            if map.values().all(|v| v.is_string()) {
                Ok(())
            } else {
                Err(AppError::BadRequest(
                    "headers values must all be strings".into(),
                ))
            }
        }
        _ => Err(AppError::BadRequest(
            "headers must be a JSON object".into(),
        )),
    }
}

/// POST /api/v1/admin/destinations
///
/// Create a new webhook destination for a workflow kind.
pub async fn create_destination(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateDestination>,
) -> AppResult<impl IntoResponse> {
    if input.url.trim().is_empty() {
        return Err(AppError::BadRequest("url must not be empty".into()));
    }
    if let Some(timeout) = input.timeout_secs {
        if timeout <= 0 {
            return Err(AppError::BadRequest("timeout_secs must be positive".into()));
        }
    }

    let headers = input
        .headers
        .unwrap_or_else(|| serde_json::json!({}));
    validate_headers(&headers)?;

    let destination = DestinationRepo::create(
        &state.pool,
        input.kind,
        input.url.trim(),
        &headers,
        input.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        input.is_enabled.unwrap_or(true),
        admin.user_id,
    )
    .await?;

    tracing::info!(
        destination_id = destination.id,
        kind = %destination.kind,
        url = %destination.url,
        user_id = admin.user_id,
        "Destination created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: destination })))
}

/// GET /api/v1/admin/destinations
///
/// List all destinations.
pub async fn list_destinations(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let destinations = DestinationRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: destinations }))
}

/// PUT /api/v1/admin/destinations/{id}
///
/// Update a destination's settings (url, headers, timeout, enabled).
pub async fn update_destination(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(destination_id): Path<DbId>,
    Json(input): Json<UpdateDestination>,
) -> AppResult<impl IntoResponse> {
    if let Some(url) = &input.url {
        if url.trim().is_empty() {
            return Err(AppError::BadRequest("url must not be empty".into()));
        }
    }
    if let Some(timeout) = input.timeout_secs {
        if timeout <= 0 {
            return Err(AppError::BadRequest("timeout_secs must be positive".into()));
        }
    }
    if let Some(headers) = &input.headers {
        validate_headers(headers)?;
    }

    let updated = DestinationRepo::update(
        &state.pool,
        destination_id,
        input.url.as_deref().map(str::trim),
        input.headers.as_ref(),
        input.timeout_secs,
        input.is_enabled,
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Destination",
        id: destination_id,
    }))?;

    tracing::info!(
        destination_id,
        user_id = admin.user_id,
        "Destination updated",
    );

    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/v1/admin/destinations/{id}
///
/// Delete a destination.
pub async fn delete_destination(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(destination_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = DestinationRepo::delete(&state.pool, destination_id).await?;

    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Destination",
            id: destination_id,
        }));
    }

    tracing::info!(
        destination_id,
        user_id = admin.user_id,
        "Destination deleted",
    );

    Ok(StatusCode::NO_CONTENT)
}
