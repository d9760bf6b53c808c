//! Core types for routevault

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A registered account, as stored
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Random 9-digit identifier
    pub user_id: String,
    pub username: String,
    pub email: String,
    /// Argon2 PHC string, never the plain password
    pub password: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    /// Last token issued to this account
    pub token: Option<String>,
}

/// Public view of a user (no credentials)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub user_id: String,
    pub username: String,
    pub email: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            created_at: user.created_at,
        }
    }
}

/// Where a route starts. Only `city` is interpreted; other keys are kept as sent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StartLocation {
    pub city: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A submitted route
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Route {
    pub route_id: String,
    /// Username of the submitter (not checked against `users`)
    pub created_by: String,
    pub route_name: String,
    #[schema(value_type = Object)]
    pub route_start_location: StartLocation,
    #[schema(value_type = Object)]
    pub route_coordinates: serde_json::Value,
    pub route_polyline_encoded: String,
    pub route_img_url: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// A user's bookmark on a route, with names copied at the time of favoriting
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FavoriteRoute {
    pub route_id: String,
    pub user_id: String,
    pub route_name: String,
    pub username: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Lower-case a city name, then capitalize its first letter
pub fn normalize_city(city: &str) -> String {
    let lower = city.trim().to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Random 9-digit numeric identifier used for users and routes
pub fn generate_id() -> String {
    rand::rng().random_range(100_000_000u32..1_000_000_000).to_string()
}
