//! Cookie parsing and the cookie attribute policy.

use axum::http::header;

use crate::jwt::TokenType;

/// Cookie name for the access token (short-lived).
pub const ACCESS_COOKIE_NAME: &str = "access_token";

/// Cookie name for the refresh token (long-lived).
pub const REFRESH_COOKIE_NAME: &str = "refresh_token";

/// Extract a cookie value from the Cookie header.
pub fn get_cookie<'a>(headers: &'a axum::http::HeaderMap, name: &str) -> Option<&'a str> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    for part in cookie_header.split(';') {
        let part = part.trim();
        if let Some((key, value)) = part.split_once('=') {
            if key.trim() == name {
                return Some(value.trim());
            }
        }
    }
    None
}

/// SameSite cookie attribute.
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    #[default]
    Lax,
    None,
}

impl SameSite {
    fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// Cookie attribute policy, declared once and consumed identically by login,
/// silent refresh, and logout. Max-age per kind matches the token lifetime.
#[derive(Clone)]
pub struct CookiePolicy {
    secure: bool,
    same_site: SameSite,
    access_max_age_secs: u64,
    refresh_max_age_secs: u64,
}

impl CookiePolicy {
    pub fn new(
        secure: bool,
        same_site: SameSite,
        access_max_age_secs: u64,
        refresh_max_age_secs: u64,
    ) -> Self {
        Self {
            secure,
            same_site,
            access_max_age_secs,
            refresh_max_age_secs,
        }
    }

    fn name_and_max_age(&self, kind: TokenType) -> (&'static str, u64) {
        match kind {
            TokenType::Access => (ACCESS_COOKIE_NAME, self.access_max_age_secs),
            TokenType::Refresh => (REFRESH_COOKIE_NAME, self.refresh_max_age_secs),
        }
    }

    fn format(&self, name: &str, value: &str, max_age: u64) -> String {
        let secure = if self.secure { "; Secure" } else { "" };
        format!(
            "{}={}; HttpOnly; SameSite={}; Path=/; Max-Age={}{}",
            name,
            value,
            self.same_site.as_str(),
            max_age,
            secure
        )
    }

    /// Build a Set-Cookie header value carrying a token.
    pub fn set(&self, kind: TokenType, value: &str) -> String {
        let (name, max_age) = self.name_and_max_age(kind);
        self.format(name, value, max_age)
    }

    /// Build a Set-Cookie header value instructing the client to delete the cookie.
    pub fn clear(&self, kind: TokenType) -> String {
        let (name, _) = self.name_and_max_age(kind);
        self.format(name, "", 0)
    }
}
