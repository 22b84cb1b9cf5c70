//! Authentication error types.
//!
//! The internal kind is never leaked to the client: guard failures collapse
//! to a single generic 401 body so responses cannot be used as an oracle on
//! token validity. Refresh failures use the two fixed messages the client
//! contract defines.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::jwt::TokenError;

/// Internal auth error kind used by the guard and the refresh middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// No access token on the request (cookie or refreshed extension)
    MissingAccessCredential,
    /// No refresh cookie to fall back on
    MissingRefreshCredential,
    /// Signature verified but the token has expired
    ExpiredCredential,
    /// Undecodable or badly signed token
    MalformedCredential,
    /// Valid token of the wrong kind
    WrongCredentialType,
    /// Token minting failed (key or clock trouble)
    Internal,
}

impl From<TokenError> for AuthError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Expired => AuthError::ExpiredCredential,
            TokenError::Malformed => AuthError::MalformedCredential,
            TokenError::WrongType => AuthError::WrongCredentialType,
            TokenError::Encoding(_) | TokenError::TimeError => AuthError::Internal,
        }
    }
}

impl AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
}

fn error_body(status: StatusCode, error: &'static str) -> Response {
    (status, Json(ErrorResponse { error })).into_response()
}

/// Rejection produced by the authentication guard on protected handlers.
#[derive(Debug)]
pub struct GuardRejection(pub AuthError);

impl IntoResponse for GuardRejection {
    fn into_response(self) -> Response {
        let message = match self.0 {
            AuthError::Internal => "Internal error",
            _ => "Not authenticated",
        };
        error_body(self.0.status_code(), message)
    }
}

/// Rejection produced by the refresh middleware when silent refresh is
/// impossible. The handler never runs.
#[derive(Debug)]
pub struct RefreshRejection(pub AuthError);

impl IntoResponse for RefreshRejection {
    fn into_response(self) -> Response {
        let message = match self.0 {
            AuthError::MissingRefreshCredential => "No refresh token provided",
            AuthError::Internal => "Internal error",
            _ => "Invalid or expired refresh token",
        };
        error_body(self.0.status_code(), message)
    }
}
