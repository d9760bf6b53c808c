//! Favorite route handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

use super::{present, DeleteResponse};
use crate::api::error::{ApiJson, ErrorResponse};
use crate::api::routes::AppState;
use crate::error::{Error, Result};
use crate::types::FavoriteRoute;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct FavoriteRequest {
    /// User adding or removing the favorite
    pub user_id: Option<String>,
}

impl FavoriteRequest {
    fn user_id(self) -> Result<String> {
        present(self.user_id)
            .ok_or_else(|| Error::ValidationFailed("Bad request. Missing user_id".into()))
    }
}

/// Favorites of a user
#[utoipa::path(
    get,
    path = "/routes/favorite_routes/{id}",
    params(
        ("id" = String, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "Favorite routes of the user", body = [FavoriteRoute]),
        (status = 404, description = "Unknown user, or no favorites", body = ErrorResponse)
    ),
    tag = "favorites"
)]
pub async fn list_favorites(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<FavoriteRoute>>> {
    let user = state
        .db
        .find_user_by_id(&user_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("User with id {} not found", user_id)))?;

    let favorites = state.db.favorites_for_user(&user.user_id).await?;
    if favorites.is_empty() {
        return Err(Error::NotFound(format!(
            "No favorite routes found for user {}",
            user.username
        )));
    }

    Ok(Json(favorites))
}

/// Add a route to a user's favorites
#[utoipa::path(
    post,
    path = "/routes/favorite_routes/{id}",
    params(
        ("id" = String, Path, description = "Route id")
    ),
    request_body = FavoriteRequest,
    responses(
        (status = 200, description = "Favorite stored", body = FavoriteRoute),
        (status = 400, description = "Missing user_id", body = ErrorResponse),
        (status = 404, description = "Unknown route or user", body = ErrorResponse),
        (status = 409, description = "Already a favorite", body = ErrorResponse)
    ),
    tag = "favorites"
)]
pub async fn add_favorite(
    State(state): State<AppState>,
    Path(route_id): Path<String>,
    ApiJson(req): ApiJson<FavoriteRequest>,
) -> Result<Json<FavoriteRoute>> {
    let user_id = req.user_id()?;
    let favorite = state.db.add_favorite(&route_id, &user_id).await?;

    tracing::info!(%route_id, %user_id, "Favorite added");
    Ok(Json(favorite))
}

/// Remove a route from a user's favorites
#[utoipa::path(
    delete,
    path = "/routes/favorite_routes/{id}",
    params(
        ("id" = String, Path, description = "Route id")
    ),
    request_body = FavoriteRequest,
    responses(
        (status = 200, description = "Favorite removed", body = DeleteResponse),
        (status = 400, description = "Missing user_id", body = ErrorResponse),
        (status = 404, description = "Unknown user, or route not a favorite", body = ErrorResponse)
    ),
    tag = "favorites"
)]
pub async fn remove_favorite(
    State(state): State<AppState>,
    Path(route_id): Path<String>,
    ApiJson(req): ApiJson<FavoriteRequest>,
) -> Result<Json<DeleteResponse>> {
    let user_id = req.user_id()?;
    let removed = state.db.remove_favorite(&route_id, &user_id).await?;

    tracing::info!(%route_id, %user_id, "Favorite removed");
    Ok(Json(DeleteResponse {
        message: format!("Route {} removed from favorites", route_id),
        deleted_count: removed,
        favorites_removed: None,
    }))
}
