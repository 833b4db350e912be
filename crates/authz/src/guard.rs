use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use shelf_http::AppError;

use crate::{error::AuthError, jwt::JwtAuthority};

/// The caller identified by a valid bearer token.
///
/// Adding this extractor to a handler makes the route require authentication;
/// requests without a valid token are rejected with 401 before the handler
/// runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
}

impl<S> FromRequestParts<S> for AuthUser
where
    Arc<JwtAuthority>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let authority = Arc::<JwtAuthority>::from_ref(state);
        let claims = authority.verify(bearer_token(&parts.headers)?)?;

        tracing::debug!(user_id = %claims.sub, "bearer token accepted");
        Ok(AuthUser {
            id: claims.sub,
            email: claims.email,
        })
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidScheme)?;

    let (scheme, token) = value
        .trim_start()
        .split_once(char::is_whitespace)
        .unwrap_or((value.trim(), ""));
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidScheme);
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}
