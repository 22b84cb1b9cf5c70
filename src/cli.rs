//! CLI argument parsing, validation, and startup helpers.

use crate::ServerConfig;
use crate::auth::SameSite;
use crate::db::Database;
use clap::Parser;
use tracing::{error, info};

const MIN_JWT_SECRET_LENGTH: usize = 32;

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "tidytask", about = "Todo API with cookie-based JWT sessions")]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8000")]
    pub port: u16,

    /// Path to SQLite database file
    #[arg(short, long, default_value = "tidytask.db")]
    pub database: String,

    /// Path to file containing JWT secret. Prefer using JWT_SECRET env var instead
    #[arg(long)]
    pub jwt_secret_file: Option<String>,

    /// Access token lifetime in minutes
    #[arg(long, env = "ACCESS_TOKEN_EXPIRY_IN_MINUTES", default_value = "30")]
    pub access_token_expiry_minutes: u64,

    /// Refresh token lifetime in minutes
    #[arg(long, env = "REFRESH_TOKEN_EXPIRY_IN_MINUTES", default_value = "1440")]
    pub refresh_token_expiry_minutes: u64,

    /// Set the Secure flag on cookies (enable when serving over HTTPS)
    #[arg(long)]
    pub secure_cookies: bool,

    /// SameSite policy for the token cookies
    #[arg(long, value_enum, default_value = "lax")]
    pub same_site: SameSite,

    /// Log output format
    #[arg(short, long, value_enum, default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Load JWT secret from environment variable or file.
/// Returns None and logs an error if the secret cannot be loaded.
pub fn load_jwt_secret(jwt_secret_file: Option<&str>) -> Option<String> {
    let secret = if let Ok(secret) = std::env::var("JWT_SECRET") {
        // Clear the environment variable to prevent leaking
        // SAFETY: We're single-threaded at this point during startup,
        // and no other code is reading this environment variable.
        unsafe { std::env::remove_var("JWT_SECRET") };
        secret
    } else if let Some(path) = jwt_secret_file {
        match std::fs::read_to_string(path) {
            Ok(content) => content.trim().to_string(),
            Err(e) => {
                error!(path = %path, error = %e, "Failed to read JWT secret file");
                return None;
            }
        }
    } else {
        error!(
            "JWT secret is required. Set JWT_SECRET environment variable (recommended) or use --jwt-secret-file"
        );
        return None;
    };

    if secret.len() < MIN_JWT_SECRET_LENGTH {
        error!(
            "JWT secret is shorter than {} characters. Use a longer secret",
            MIN_JWT_SECRET_LENGTH
        );
        return None;
    }

    Some(secret)
}

/// Check the token lifetime invariant: access must expire before refresh.
/// Returns false and logs an error if violated.
pub fn validate_expiries(access_minutes: u64, refresh_minutes: u64) -> bool {
    if access_minutes == 0 {
        error!("Access token expiry must be at least 1 minute");
        return false;
    }
    if access_minutes >= refresh_minutes {
        error!(
            access = access_minutes,
            refresh = refresh_minutes,
            "Access token expiry must be shorter than refresh token expiry"
        );
        return false;
    }
    true
}

/// Build ServerConfig from validated arguments.
pub fn build_config(args: &Args, db: Database, jwt_secret: String) -> ServerConfig {
    ServerConfig {
        db,
        jwt_secret: jwt_secret.into_bytes(),
        access_token_expiry_mins: args.access_token_expiry_minutes,
        refresh_token_expiry_mins: args.refresh_token_expiry_minutes,
        secure_cookies: args.secure_cookies,
        same_site: args.same_site,
    }
}

/// Open the database, logging errors if it fails.
pub async fn open_database(path: &str) -> Option<Database> {
    match Database::open(path).await {
        Ok(db) => {
            info!(path = %path, "Database opened");
            Some(db)
        }
        Err(e) => {
            error!(path = %path, error = %e, "Failed to open database");
            None
        }
    }
}
