//! Route record handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use super::{present, DeleteResponse};
use crate::api::error::{ApiJson, ErrorResponse};
use crate::api::routes::AppState;
use crate::error::{Error, Result};
use crate::store::with_fresh_id;
use crate::types::{normalize_city, Route, StartLocation};

#[derive(Debug, Deserialize, IntoParams)]
pub struct CityParams {
    /// Only routes created by this user
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct DeleteAllParams {
    /// Must match the configured delete key
    #[serde(rename = "deleteKey")]
    pub delete_key: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateRouteRequest {
    /// Username of the submitter
    pub created_by: Option<String>,
    pub route_name: Option<String>,
    /// Object with at least a `city` string
    #[schema(value_type = Object)]
    pub route_start_location: Option<serde_json::Value>,
    #[schema(value_type = Object)]
    pub route_coordinates: Option<serde_json::Value>,
    pub route_polyline_encoded: Option<String>,
    pub route_img_url: Option<String>,
}

/// Fields of a create request that passed validation
struct NewRoute {
    created_by: String,
    route_name: String,
    start_location: StartLocation,
    coordinates: serde_json::Value,
    polyline_encoded: String,
    img_url: String,
}

impl CreateRouteRequest {
    fn validate(self) -> Result<NewRoute> {
        let created_by = present(self.created_by);
        let route_name = present(self.route_name);
        let polyline_encoded = present(self.route_polyline_encoded);
        let img_url = present(self.route_img_url);

        let mut missing = Vec::new();
        for (name, ok) in [
            ("created_by", created_by.is_some()),
            ("route_coordinates", self.route_coordinates.is_some()),
            ("route_img_url", img_url.is_some()),
            ("route_name", route_name.is_some()),
            ("route_polyline_encoded", polyline_encoded.is_some()),
            ("route_start_location", self.route_start_location.is_some()),
        ] {
            if !ok {
                missing.push(name);
            }
        }

        let (
            Some(created_by),
            Some(route_name),
            Some(start_location),
            Some(coordinates),
            Some(polyline_encoded),
            Some(img_url),
        ) = (
            created_by,
            route_name,
            self.route_start_location,
            self.route_coordinates,
            polyline_encoded,
            img_url,
        )
        else {
            return Err(Error::ValidationFailed(format!(
                "Bad request. Missing required fields: {}",
                missing.join(", ")
            )));
        };

        let mut start_location: StartLocation = serde_json::from_value(start_location)
            .map_err(|_| {
                Error::ValidationFailed(
                    "route_start_location must be an object with a city".into(),
                )
            })?;
        start_location.city = normalize_city(&start_location.city);
        if start_location.city.is_empty() {
            return Err(Error::ValidationFailed(
                "route_start_location.city must not be empty".into(),
            ));
        }

        Ok(NewRoute {
            created_by,
            route_name,
            start_location,
            coordinates,
            polyline_encoded,
            img_url,
        })
    }
}

/// List all routes
#[utoipa::path(
    get,
    path = "/routes",
    responses(
        (status = 200, description = "All routes", body = [Route]),
        (status = 500, description = "Internal error", body = ErrorResponse)
    ),
    tag = "routes"
)]
pub async fn list_routes(State(state): State<AppState>) -> Result<Json<Vec<Route>>> {
    Ok(Json(state.db.list_routes().await?))
}

/// Routes starting in a city (case-insensitive), optionally only one user's
#[utoipa::path(
    get,
    path = "/routes/city/{city}",
    params(
        ("city" = String, Path, description = "City name, any casing"),
        CityParams
    ),
    responses(
        (status = 200, description = "Matching routes", body = [Route]),
        (status = 404, description = "user_id given but unknown", body = ErrorResponse)
    ),
    tag = "routes"
)]
pub async fn routes_by_city(
    State(state): State<AppState>,
    Path(city): Path<String>,
    Query(params): Query<CityParams>,
) -> Result<Json<Vec<Route>>> {
    let city = normalize_city(&city);

    let created_by = match present(params.user_id) {
        Some(user_id) => {
            let user = state
                .db
                .find_user_by_id(&user_id)
                .await?
                .ok_or_else(|| Error::NotFound(format!("User with id {} not found", user_id)))?;
            Some(user.username)
        }
        None => None,
    };

    let routes = state.db.routes_by_city(&city, created_by.as_deref()).await?;
    tracing::debug!(%city, count = routes.len(), "Routes by city");
    Ok(Json(routes))
}

/// Routes created by a user
#[utoipa::path(
    get,
    path = "/routes/user/{id}",
    params(
        ("id" = String, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "Routes created by the user", body = [Route]),
        (status = 404, description = "Unknown user", body = ErrorResponse)
    ),
    tag = "routes"
)]
pub async fn routes_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Route>>> {
    let user = state
        .db
        .find_user_by_id(&user_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("User with id {} not found", user_id)))?;

    Ok(Json(state.db.routes_by_creator(&user.username).await?))
}

/// Submit a route
#[utoipa::path(
    post,
    path = "/routes",
    request_body = CreateRouteRequest,
    responses(
        (status = 200, description = "Route stored", body = Route),
        (status = 400, description = "Missing or malformed fields", body = ErrorResponse)
    ),
    tag = "routes"
)]
pub async fn create_route(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateRouteRequest>,
) -> Result<Json<Route>> {
    let new = req.validate()?;
    let created_at = Utc::now();
    let db = &state.db;

    let route = with_fresh_id(move |route_id| {
        let route = Route {
            route_id,
            created_by: new.created_by.clone(),
            route_name: new.route_name.clone(),
            route_start_location: new.start_location.clone(),
            route_coordinates: new.coordinates.clone(),
            route_polyline_encoded: new.polyline_encoded.clone(),
            route_img_url: new.img_url.clone(),
            created_at,
        };
        db.insert_route(route)
    })
    .await?;

    tracing::info!(route_id = %route.route_id, created_by = %route.created_by, "Route created");
    Ok(Json(route))
}

/// Delete a route and the favorites pointing at it
#[utoipa::path(
    delete,
    path = "/routes/id/{id}",
    params(
        ("id" = String, Path, description = "Route id")
    ),
    responses(
        (status = 200, description = "Route deleted", body = DeleteResponse),
        (status = 404, description = "Route not found", body = ErrorResponse)
    ),
    tag = "routes"
)]
pub async fn delete_route(
    State(state): State<AppState>,
    Path(route_id): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let deletion = state.db.delete_route(&route_id).await?;

    tracing::info!(%route_id, favorites = deletion.favorites, "Route deleted");
    Ok(Json(DeleteResponse {
        message: format!("Route {} deleted", route_id),
        deleted_count: deletion.routes,
        favorites_removed: Some(deletion.favorites),
    }))
}

/// Delete every route. Requires the configured delete key.
#[utoipa::path(
    delete,
    path = "/routes/all",
    params(DeleteAllParams),
    responses(
        (status = 200, description = "All routes deleted", body = DeleteResponse),
        (status = 401, description = "Wrong or missing delete key", body = ErrorResponse)
    ),
    tag = "routes"
)]
pub async fn delete_all_routes(
    State(state): State<AppState>,
    Query(params): Query<DeleteAllParams>,
) -> Result<Json<DeleteResponse>> {
    let authorized = match (state.delete_key.as_deref(), params.delete_key.as_deref()) {
        (Some(expected), Some(given)) => !expected.is_empty() && expected == given,
        _ => false,
    };
    if !authorized {
        tracing::warn!("Rejected delete-all request with wrong or missing key");
        return Err(Error::Unauthorized("Unauthorized".into()));
    }

    let deletion = state.db.delete_all_routes().await?;

    tracing::warn!(routes = deletion.routes, favorites = deletion.favorites, "Deleted all routes");
    Ok(Json(DeleteResponse {
        message: "All routes deleted".into(),
        deleted_count: deletion.routes,
        favorites_removed: Some(deletion.favorites),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_request() -> CreateRouteRequest {
        CreateRouteRequest {
            created_by: Some("ada".into()),
            route_name: Some("Canal loop".into()),
            route_start_location: Some(json!({ "city": "aMSTERDAM", "lat": 52.37 })),
            route_coordinates: Some(json!([[52.37, 4.89], [52.38, 4.90]])),
            route_polyline_encoded: Some("_p~iF~ps|U".into()),
            route_img_url: Some("https://example.com/a.png".into()),
        }
    }

    #[test]
    fn test_validate_normalizes_city() {
        let new = full_request().validate().unwrap();
        assert_eq!(new.start_location.city, "Amsterdam");
        assert_eq!(new.start_location.extra["lat"], json!(52.37));
    }

    #[test]
    fn test_validate_lists_missing_fields() {
        let req = CreateRouteRequest {
            route_name: Some("  ".into()),
            route_img_url: None,
            ..full_request()
        };

        match req.validate() {
            Err(Error::ValidationFailed(msg)) => {
                assert!(msg.contains("route_name"));
                assert!(msg.contains("route_img_url"));
                assert!(!msg.contains("created_by"));
            }
            other => panic!("expected validation failure, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_validate_requires_city() {
        let req = CreateRouteRequest {
            route_start_location: Some(json!({ "lat": 1.0 })),
            ..full_request()
        };
        assert!(matches!(req.validate(), Err(Error::ValidationFailed(_))));

        let req = CreateRouteRequest {
            route_start_location: Some(json!({ "city": " " })),
            ..full_request()
        };
        assert!(matches!(req.validate(), Err(Error::ValidationFailed(_))));
    }
}
