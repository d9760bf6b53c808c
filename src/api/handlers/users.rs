//! User account handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::ToSchema;

use super::{present, DeleteResponse};
use crate::api::error::{ApiJson, ErrorResponse};
use crate::api::routes::AppState;
use crate::auth::{password, Claims};
use crate::error::{Error, Result};
use crate::store::with_fresh_id;
use crate::types::{User, UserProfile};

/// Usernames that collide with literal `/users/...` paths and could never be fetched
const RESERVED_USERNAMES: [&str; 3] = ["register", "login", "delete"];

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// List all users
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "All users", body = [UserProfile]),
        (status = 500, description = "Internal error", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserProfile>>> {
    let users = state.db.list_users().await?;
    Ok(Json(users.iter().map(UserProfile::from).collect()))
}

/// Create an account and issue its first token
#[utoipa::path(
    post,
    path = "/users/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Missing field, or reserved username", body = ErrorResponse),
        (status = 409, description = "Username or email already taken", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<User>)> {
    let (Some(username), Some(email), Some(plain)) =
        (present(req.username), present(req.email), present(req.password))
    else {
        return Err(Error::ValidationFailed(
            "Bad request. You are either missing a username, email or password".into(),
        ));
    };
    if RESERVED_USERNAMES.contains(&username.as_str()) {
        return Err(Error::ValidationFailed(format!(
            "The username \"{}\" is reserved",
            username
        )));
    }

    let password_hash = password::hash(plain).await?;
    let created_at = Utc::now();
    let state_ref = &state;

    let user = with_fresh_id(move |user_id| {
        let user = User {
            user_id,
            username: username.clone(),
            email: email.clone(),
            password: password_hash.clone(),
            created_at,
            token: None,
        };
        async move {
            let token = state_ref.tokens.issue(&user.user_id, &user.email)?;
            state_ref
                .db
                .insert_user(User {
                    token: Some(token),
                    ..user
                })
                .await
        }
    })
    .await?;

    tracing::info!(user_id = %user.user_id, username = %user.username, "Registered user");
    Ok((StatusCode::CREATED, Json(user)))
}

/// Check credentials and issue a fresh token
#[utoipa::path(
    post,
    path = "/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in; the document carries the new token", body = User),
        (status = 400, description = "Missing email or password", body = ErrorResponse),
        (status = 401, description = "Wrong email or password", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<User>> {
    let (Some(email), Some(plain)) = (present(req.email), present(req.password)) else {
        return Err(Error::ValidationFailed(
            "Bad request. You are either missing an email or password".into(),
        ));
    };

    let invalid = || Error::Unauthorized("Invalid email or password".into());

    let mut user = state.db.find_user_by_email(&email).await?.ok_or_else(invalid)?;
    if !password::verify(plain, user.password.clone()).await? {
        tracing::debug!(user_id = %user.user_id, "Login rejected: wrong password");
        return Err(invalid());
    }

    let token = state.tokens.issue(&user.user_id, &user.email)?;
    state.db.update_token(&user.user_id, &token).await?;
    user.token = Some(token);

    tracing::info!(user_id = %user.user_id, "User logged in");
    Ok(Json(user))
}

/// Fetch a user by username
#[utoipa::path(
    get,
    path = "/users/{username}",
    params(
        ("username" = String, Path, description = "Username")
    ),
    responses(
        (status = 200, description = "User found", body = UserProfile),
        (status = 401, description = "Invalid token", body = ErrorResponse),
        (status = 403, description = "Token missing", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UserProfile>> {
    let user = state
        .db
        .find_user_by_username(&username)
        .await?
        .ok_or_else(|| Error::NotFound(format!("User \"{}\" not found", username)))?;
    Ok(Json(UserProfile::from(&user)))
}

/// Delete the user with this email
#[utoipa::path(
    delete,
    path = "/users/{email}",
    params(
        ("email" = String, Path, description = "Email address of the account")
    ),
    responses(
        (status = 200, description = "User deleted", body = DeleteResponse),
        (status = 404, description = "No user with this email", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn delete_user_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let deleted = state.db.delete_user_by_email(&email).await?;
    if deleted == 0 {
        return Err(Error::NotFound(format!("No user with email \"{}\"", email)));
    }

    tracing::info!(%email, "Deleted user by email");
    Ok(Json(DeleteResponse {
        message: format!("User with email \"{}\" deleted", email),
        deleted_count: deleted,
        favorites_removed: None,
    }))
}

/// Delete the account the token belongs to
#[utoipa::path(
    delete,
    path = "/users/delete",
    responses(
        (status = 200, description = "Account deleted", body = DeleteResponse),
        (status = 401, description = "Invalid token", body = ErrorResponse),
        (status = 403, description = "Token missing", body = ErrorResponse),
        (status = 404, description = "Account already gone", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn delete_self(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<DeleteResponse>> {
    let deleted = state.db.delete_user_by_id(&claims.user_id).await?;
    if deleted == 0 {
        return Err(Error::NotFound(format!("User with id {} not found", claims.user_id)));
    }

    tracing::info!(user_id = %claims.user_id, "User deleted own account");
    Ok(Json(DeleteResponse {
        message: "Account deleted".into(),
        deleted_count: deleted,
        favorites_removed: None,
    }))
}
