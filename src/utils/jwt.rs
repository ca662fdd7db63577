// src/utils/jwt.rs

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::AppError, state::AppState};

pub const ADMIN_ROLE: &str = "admin";

/// JWT Claims structure.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    /// Subject - the admin session id.
    pub sub: String,
    pub role: String,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

impl Claims {
    pub fn session_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }
}

/// Signs a bearer token for an admin session.
pub fn sign_jwt(session_id: Uuid, secret: &str, expiration_seconds: u64) -> Result<String, AppError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .as_secs();
    let expiration = now
        .checked_add(expiration_seconds)
        .and_then(|exp| usize::try_from(exp).ok())
        .ok_or_else(|| {
            AppError::InternalServerError(format!(
                "token lifetime of {}s is out of range",
                expiration_seconds
            ))
        })?;

    let claims = Claims {
        sub: session_id.to_string(),
        role: ADMIN_ROLE.to_owned(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Verifies and decodes a JWT string.
///
/// Returns the `Claims` if valid, otherwise returns an `AppError`.
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims, AppError> {
    let token_data = decode(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::AuthError("Invalid token".to_string()))?;

    Ok(token_data.claims)
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

/// Resolves a request's bearer token to a live, logged-in admin session id.
pub async fn authenticated_session(state: &AppState, headers: &HeaderMap) -> Option<Uuid> {
    let token = bearer_token(headers)?;
    let claims = verify_jwt(token, &state.config.jwt_secret).ok()?;
    if claims.role != ADMIN_ROLE {
        return None;
    }
    let session_id = claims.session_id()?;
    state
        .sessions
        .get(session_id)
        .await
        .is_authenticated()
        .then_some(session_id)
}

/// Axum Middleware: Admin Authorization.
///
/// Requires a valid bearer token whose session is still `LoggedIn` in the
/// registry. Logged-out or unknown sessions get 401 even if the token has
/// not expired. Injects an [`AdminContext`] into the request extensions.
pub async fn admin_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    // Body is !Sync; no borrow of `req` may live across the await.
    let headers = req.headers().clone();
    let session_id = authenticated_session(&state, &headers)
        .await
        .ok_or_else(|| AppError::AuthError("Admin login required".to_string()))?;

    req.extensions_mut().insert(AdminContext { session_id });
    Ok(next.run(req).await)
}

/// Request extension set by [`admin_middleware`].
#[derive(Debug, Clone, Copy)]
pub struct AdminContext {
    pub session_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn signed_token_round_trips_session_id() {
        let session_id = Uuid::new_v4();
        let token = sign_jwt(session_id, "secret", 60).unwrap();

        let claims = verify_jwt(&token, "secret").unwrap();
        assert_eq!(claims.session_id(), Some(session_id));
        assert_eq!(claims.role, ADMIN_ROLE);
    }

    #[test]
    fn oversized_lifetime_is_an_error() {
        assert!(matches!(
            sign_jwt(Uuid::new_v4(), "secret", u64::MAX),
            Err(AppError::InternalServerError(_))
        ));
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let token = sign_jwt(Uuid::new_v4(), "secret", 60).unwrap();
        assert!(matches!(
            verify_jwt(&token, "other"),
            Err(AppError::AuthError(_))
        ));
    }

    #[test]
    fn bearer_prefix_is_required() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Token abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(bearer_token(&headers), Some("abc"));
    }
}
