//! Silent-refresh middleware for protected routes.
//!
//! Two-phase per request: before the handler, an absent or no-longer-valid
//! access cookie is replaced by a token minted from a valid refresh cookie
//! (or the request is rejected outright); after the handler, any newly
//! minted token is attached
//! to the outgoing response as a cookie. The minted token travels only in a
//! local and a request extension, never in state shared across requests.
//!
//! Public routes (login, register, check-auth) are assembled without this
//! layer, which is the path allow-list.

use axum::{
    extract::{Request, State},
    http::{HeaderValue, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::cookie::{ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME, get_cookie};
use super::errors::{AuthError, RefreshRejection};
use crate::AppState;
use crate::jwt::{IssuedToken, TokenType};

/// True when the request carries an access cookie that would satisfy the
/// guard, in which case the middleware stays out of the way.
fn has_valid_access_cookie(state: &AppState, request: &Request) -> bool {
    get_cookie(request.headers(), ACCESS_COOKIE_NAME)
        .map(|token| state.jwt.validate(token, TokenType::Access).is_ok())
        .unwrap_or(false)
}

/// Request extension carrying an access token minted by silent refresh,
/// read by the guard instead of the (absent) access cookie.
#[derive(Clone)]
pub struct RefreshedAccessToken(pub String);

/// Pre/post-handler hook implementing the silent-refresh state machine.
pub async fn refresh_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let minted: Option<IssuedToken> = if has_valid_access_cookie(&state, &request) {
        None
    } else {
        // Access cookie absent, expired, or otherwise unusable: fall back to
        // the refresh cookie or reject before the handler runs.
        let Some(refresh_token) = get_cookie(request.headers(), REFRESH_COOKIE_NAME) else {
            return RefreshRejection(AuthError::MissingRefreshCredential).into_response();
        };

        match state.jwt.refresh_access(refresh_token) {
            Ok(token) => {
                request
                    .extensions_mut()
                    .insert(RefreshedAccessToken(token.token.clone()));
                Some(token)
            }
            // Expected control flow, not an application error.
            Err(e) => return RefreshRejection(AuthError::from(e)).into_response(),
        }
    };

    let mut response = next.run(request).await;

    if let Some(token) = minted {
        // A handler that already set the access cookie (logout clearing it)
        // wins over the minted token.
        let already_set = response.headers().get_all(SET_COOKIE).iter().any(|v| {
            v.to_str()
                .map(|s| s.split('=').next() == Some(ACCESS_COOKIE_NAME))
                .unwrap_or(false)
        });

        if !already_set {
            let cookie = state.cookies.set(TokenType::Access, &token.token);
            if let Ok(value) = HeaderValue::from_str(&cookie) {
                response.headers_mut().append(SET_COOKIE, value);
            }
        }
    }

    response
}
