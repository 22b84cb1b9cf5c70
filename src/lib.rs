pub mod api;
pub mod auth;
pub mod cli;
pub mod db;
pub mod jwt;
pub mod password;

use api::create_api_router;
use auth::{CookiePolicy, HasAuthState, SameSite};
use axum::Router;
use db::Database;
use jwt::JwtConfig;
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct ServerConfig {
    /// Database connection (cloneable, uses connection pool internally)
    pub db: Database,
    /// JWT secret for signing tokens
    pub jwt_secret: Vec<u8>,
    /// Access token lifetime in minutes (must be less than refresh)
    pub access_token_expiry_mins: u64,
    /// Refresh token lifetime in minutes
    pub refresh_token_expiry_mins: u64,
    /// Whether to set the Secure flag on cookies (true behind HTTPS)
    pub secure_cookies: bool,
    /// SameSite policy for both cookies
    pub same_site: SameSite,
}

/// Shared application state: read-only after startup, cloned per router.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
    pub cookies: CookiePolicy,
}

impl HasAuthState for AppState {
    fn jwt(&self) -> &JwtConfig {
        &self.jwt
    }
}

/// Create the application router with the given configuration.
pub fn create_app(config: &ServerConfig) -> Router {
    let access_secs = config.access_token_expiry_mins * 60;
    let refresh_secs = config.refresh_token_expiry_mins * 60;

    let jwt = Arc::new(JwtConfig::new(&config.jwt_secret, access_secs, refresh_secs));
    let cookies = CookiePolicy::new(
        config.secure_cookies,
        config.same_site,
        access_secs,
        refresh_secs,
    );

    let state = AppState {
        db: config.db.clone(),
        jwt,
        cookies,
    };

    Router::new().nest("/api", create_api_router(state))
}

/// Run the server on the given listener. This function blocks until the server exits.
pub async fn run_server(config: ServerConfig, listener: TcpListener) -> Result<(), std::io::Error> {
    let app = create_app(&config);
    axum::serve(listener, app).await
}
