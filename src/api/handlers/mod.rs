//! API request handlers

pub mod favorites;
pub mod routes;
pub mod users;

use axum::{response::Redirect, Json};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// API version
    pub version: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse {
    pub message: String,
    /// Number of primary records removed
    pub deleted_count: usize,
    /// Favorites removed along with deleted routes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorites_removed: Option<usize>,
}

/// Treat missing and blank strings alike
pub(crate) fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

/// Landing page
pub async fn root() -> Redirect {
    Redirect::to("/info.html")
}
