//! Bearer-token gate for routes that act on the calling user

use axum::{
    body::{self, Body},
    extract::{Query, Request, State},
    http::{header, HeaderMap, Uri},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;

use super::routes::AppState;
use crate::error::{Error, Result};

/// Largest request body the gate will buffer while looking for a token
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Header names accepted for the raw token, checked in order
const TOKEN_HEADERS: [&str; 2] = ["x-access-token", "auth"];

#[derive(Debug, Deserialize)]
struct TokenField {
    token: Option<String>,
}

/// Require a valid token, then expose its [`Claims`](crate::auth::Claims) as a request extension.
///
/// The token may come from the JSON body field `token`, the `token` query
/// parameter, the `x-access-token` or `auth` header, or `Authorization: Bearer`.
pub async fn require_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response> {
    let (parts, body) = request.into_parts();
    let bytes = body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|_| Error::ValidationFailed("Request body too large".into()))?;

    let token = token_from_body(&bytes)
        .or_else(|| token_from_query(&parts.uri))
        .or_else(|| token_from_headers(&parts.headers))
        .ok_or_else(|| Error::Forbidden("A token is required for authentication".into()))?;

    let claims = state.tokens.verify(&token).map_err(|err| {
        tracing::debug!(error = %err, "Token verification failed");
        Error::Unauthorized("Invalid token".into())
    })?;

    let mut request = Request::from_parts(parts, Body::from(bytes));
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

fn non_empty(token: Option<String>) -> Option<String> {
    token.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

fn token_from_body(bytes: &[u8]) -> Option<String> {
    if bytes.is_empty() {
        return None;
    }
    serde_json::from_slice::<TokenField>(bytes)
        .ok()
        .and_then(|field| non_empty(field.token))
}

fn token_from_query(uri: &Uri) -> Option<String> {
    Query::<TokenField>::try_from_uri(uri)
        .ok()
        .and_then(|Query(field)| non_empty(field.token))
}

fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let raw = TOKEN_HEADERS
        .iter()
        .find_map(|name| headers.get(*name).and_then(|v| v.to_str().ok()).map(String::from));
    if let Some(token) = non_empty(raw) {
        return Some(token);
    }

    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(String::from);
    non_empty(bearer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_token_from_body() {
        assert_eq!(token_from_body(br#"{"token":"abc","user_id":"1"}"#).as_deref(), Some("abc"));
        assert_eq!(token_from_body(br#"{"user_id":"1"}"#), None);
        assert_eq!(token_from_body(br#"{"token":"  "}"#), None);
        assert_eq!(token_from_body(b"not json"), None);
        assert_eq!(token_from_body(b""), None);
    }

    #[test]
    fn test_token_from_query() {
        let uri: Uri = "/users/ada?token=abc".parse().unwrap();
        assert_eq!(token_from_query(&uri).as_deref(), Some("abc"));

        let uri: Uri = "/users/ada".parse().unwrap();
        assert_eq!(token_from_query(&uri), None);
    }

    #[test]
    fn test_token_from_headers() {
        let mut headers = HeaderMap::new();
        assert_eq!(token_from_headers(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer bearer-token"));
        assert_eq!(token_from_headers(&headers).as_deref(), Some("bearer-token"));

        headers.insert("auth", HeaderValue::from_static("auth-token"));
        assert_eq!(token_from_headers(&headers).as_deref(), Some("auth-token"));

        headers.insert("x-access-token", HeaderValue::from_static("access-token"));
        assert_eq!(token_from_headers(&headers).as_deref(), Some("access-token"));
    }

    #[test]
    fn test_non_bearer_authorization_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic Zm9vOmJhcg=="));
        assert_eq!(token_from_headers(&headers), None);
    }
}
