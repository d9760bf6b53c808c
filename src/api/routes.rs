//! API route definitions

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::error::ErrorResponse;
use super::gate;
use super::handlers::{
    self,
    favorites::{self, FavoriteRequest},
    routes::{self, CreateRouteRequest},
    users::{self, LoginRequest, RegisterRequest},
    DeleteResponse, HealthResponse,
};
use crate::auth::TokenIssuer;
use crate::config::Config;
use crate::error::Result;
use crate::store::Database;
use crate::types::{FavoriteRoute, Route, User, UserProfile};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Routevault API",
        version = "0.1.0",
        description = "Users, submitted routes and favorite routes"
    ),
    tags(
        (name = "users", description = "Accounts and tokens"),
        (name = "routes", description = "Route records"),
        (name = "favorites", description = "Favorite routes per user"),
        (name = "health", description = "Health checks")
    ),
    paths(
        handlers::health,
        users::list_users,
        users::register,
        users::login,
        users::get_user,
        users::delete_user_by_email,
        users::delete_self,
        routes::list_routes,
        routes::create_route,
        routes::routes_by_city,
        routes::routes_by_user,
        routes::delete_route,
        routes::delete_all_routes,
        favorites::list_favorites,
        favorites::add_favorite,
        favorites::remove_favorite,
    ),
    components(schemas(
        User,
        UserProfile,
        Route,
        FavoriteRoute,
        ErrorResponse,
        DeleteResponse,
        HealthResponse,
        RegisterRequest,
        LoginRequest,
        CreateRouteRequest,
        FavoriteRequest,
    ))
)]
pub struct ApiDoc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub tokens: TokenIssuer,
    pub delete_key: Option<String>,
}

impl AppState {
    /// Open the database and token issuer described by `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            db: Database::open(config)?,
            tokens: TokenIssuer::new(config.token_key()?, config.token_ttl()),
            delete_key: config.delete_key.clone(),
        })
    }
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let openapi = ApiDoc::openapi();
    let gate = middleware::from_fn_with_state(state.clone(), gate::require_token);

    Router::new()
        .route("/", get(handlers::root))

        // Users. The gate only wraps methods registered before `route_layer`.
        .route("/users", get(users::list_users))
        .route("/users/register", post(users::register))
        .route("/users/login", post(users::login))
        .route("/users/delete", delete(users::delete_self).route_layer(gate.clone()))
        .route(
            "/users/{username}",
            get(users::get_user)
                .route_layer(gate)
                .delete(users::delete_user_by_email),
        )

        // Routes
        .route("/routes", get(routes::list_routes).post(routes::create_route))
        .route("/routes/all", delete(routes::delete_all_routes))
        .route("/routes/city/{city}", get(routes::routes_by_city))
        .route("/routes/user/{id}", get(routes::routes_by_user))
        .route("/routes/id/{id}", delete(routes::delete_route))

        // Favorites: `id` is the user for GET and the route for POST/DELETE
        .route(
            "/routes/favorite_routes/{id}",
            get(favorites::list_favorites)
                .post(favorites::add_favorite)
                .delete(favorites::remove_favorite),
        )

        // Health
        .route("/health", get(handlers::health))

        // OpenAPI document and Swagger UI
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", openapi))

        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
