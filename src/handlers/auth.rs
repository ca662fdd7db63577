// src/handlers/auth.rs

use axum::{
    Extension, Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    models::session::{AdminSession, LoginRequest},
    state::AppState,
    utils::{
        extract::AppJson,
        jwt::{AdminContext, authenticated_session, sign_jwt},
    },
};

/// Logs a client in as admin and returns a bearer token.
///
/// Each login opens a new session that starts `LoggedOut`; only a correct
/// password moves it to `LoggedIn` and registers it.
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let session_id = Uuid::new_v4();
    let session = AdminSession::default()
        .authenticate(&payload.password, &state.admin)
        .inspect_err(|_| tracing::warn!("Rejected admin login attempt"))?;

    let token = sign_jwt(
        session_id,
        &state.config.jwt_secret,
        state.config.jwt_expiration,
    )?;
    state.sessions.set(session_id, session).await;
    tracing::info!("Admin session {} logged in", session_id);

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
        "expires_in": state.config.jwt_expiration
    })))
}

/// Ends the caller's admin session. The token stops working immediately.
pub async fn logout(
    State(state): State<AppState>,
    Extension(ctx): Extension<AdminContext>,
) -> impl IntoResponse {
    let session = state.sessions.get(ctx.session_id).await.logout();
    state.sessions.set(ctx.session_id, session).await;

    let active = state.sessions.active_count().await;
    tracing::info!(
        "Admin session {} logged out ({} still active)",
        ctx.session_id,
        active
    );
    StatusCode::NO_CONTENT
}

/// Reports whether the presented token belongs to a logged-in session.
/// Never fails: a missing or bad token simply reads as logged out.
pub async fn session_status(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let authenticated = authenticated_session(&state, &headers).await.is_some();
    Json(json!({ "authenticated": authenticated }))
}
