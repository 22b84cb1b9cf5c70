//! Cookie-based JWT authentication.
//!
//! Dual-token system: short-lived access tokens (default 30 min, stateless)
//! and long-lived refresh tokens (default 24 h). When the access cookie is
//! missing, the refresh middleware silently mints a new access token from a
//! valid refresh cookie before the handler runs.

mod cookie;
mod errors;
mod guard;
mod refresh;

pub use cookie::{ACCESS_COOKIE_NAME, CookiePolicy, REFRESH_COOKIE_NAME, SameSite, get_cookie};
pub use errors::{AuthError, GuardRejection, RefreshRejection};
pub use guard::{Auth, CurrentUser, HasAuthState};
pub use refresh::{RefreshedAccessToken, refresh_session};
