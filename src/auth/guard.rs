//! Axum extractor gating protected handlers.

use axum::{extract::FromRequestParts, http::request::Parts};

use super::cookie::{ACCESS_COOKIE_NAME, get_cookie};
use super::errors::{AuthError, GuardRejection};
use super::refresh::RefreshedAccessToken;
use crate::jwt::{Claims, JwtConfig, TokenType};

/// Trait for state types that provide JWT access for authentication.
pub trait HasAuthState {
    fn jwt(&self) -> &JwtConfig;
}

/// Identity resolved from a validated access token.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// Claims from the access token
    pub claims: Claims,
}

/// Extractor for handlers that require authentication.
///
/// Runs after the refresh middleware: if silent refresh minted a new access
/// token this request, it is read from the request extension the middleware
/// planted, never from the cookie that only exists on the outgoing response.
pub struct Auth(pub CurrentUser);

impl<S> FromRequestParts<S> for Auth
where
    S: HasAuthState + Send + Sync,
{
    type Rejection = GuardRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let refreshed = parts
            .extensions
            .get::<RefreshedAccessToken>()
            .map(|t| t.0.clone());

        let token = match refreshed {
            Some(token) => token,
            None => get_cookie(&parts.headers, ACCESS_COOKIE_NAME)
                .ok_or(GuardRejection(AuthError::MissingAccessCredential))?
                .to_string(),
        };

        let claims = state
            .jwt()
            .validate(&token, TokenType::Access)
            .map_err(|e| GuardRejection(AuthError::from(e)))?;

        Ok(Auth(CurrentUser { claims }))
    }
}
