//! Session boundary endpoints: login, logout, check-auth.
//!
//! - POST `/login` - Verify credentials, issue both token cookies
//! - POST `/logout` - Instruct the client to drop both cookies
//! - GET `/check-auth` - Probe whether the refresh token is still usable

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse},
};
use serde::Deserialize;

use super::error::{ApiError, ResultExt};
use crate::AppState;
use crate::auth::{Auth, REFRESH_COOKIE_NAME, get_cookie};
use crate::jwt::TokenType;
use crate::password;

#[derive(Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
}

/// Verify credentials and start a session: mint the access/refresh pair and
/// set both cookies. A failed login sets no cookies at all.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .db
        .users()
        .get_by_username(&payload.username)
        .await
        .db_err("Failed to look up user")?;

    let verified = user
        .as_ref()
        .map(|u| password::verify(&payload.password, &u.password_hash))
        .unwrap_or(false);

    let Some(user) = user.filter(|_| verified) else {
        return Ok((
            StatusCode::UNAUTHORIZED,
            AppendHeaders(vec![]),
            Json(serde_json::json!({
                "message": "Invalid credentials",
                "authenticated": false,
            })),
        ));
    };

    let pair = state.jwt.issue(&user.uuid, &user.username).map_err(|e| {
        tracing::error!(error = %e, "Failed to issue tokens");
        ApiError::internal("Failed to issue tokens")
    })?;

    let access_cookie = state.cookies.set(TokenType::Access, &pair.access.token);
    let refresh_cookie = state.cookies.set(TokenType::Refresh, &pair.refresh.token);

    Ok((
        StatusCode::OK,
        AppendHeaders(vec![
            (SET_COOKIE, access_cookie),
            (SET_COOKIE, refresh_cookie),
        ]),
        Json(serde_json::json!({ "message": "Login successful" })),
    ))
}

/// End the session by instructing the client to delete both cookies.
/// This is client-side only: tokens already replayed elsewhere stay
/// cryptographically valid until their natural expiry.
pub async fn logout(State(state): State<AppState>, Auth(_user): Auth) -> impl IntoResponse {
    let clear_access = state.cookies.clear(TokenType::Access);
    let clear_refresh = state.cookies.clear(TokenType::Refresh);

    (
        StatusCode::OK,
        AppendHeaders([(SET_COOKIE, clear_access), (SET_COOKIE, clear_refresh)]),
        Json(serde_json::json!({ "message": "Logged out successfully" })),
    )
}

/// Unauthenticated probe: is the refresh token still good enough that a
/// protected call would succeed? Never mutates cookies.
pub async fn check_auth(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let valid = get_cookie(&headers, REFRESH_COOKIE_NAME)
        .map(|token| state.jwt.validate(token, TokenType::Refresh).is_ok())
        .unwrap_or(false);

    if valid {
        (
            StatusCode::OK,
            Json(serde_json::json!({ "authenticated": true })),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({
                "authenticated": false,
                "message": "Session expired. Please login again.",
            })),
        )
    }
}
