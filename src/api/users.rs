//! User registration with per-field validation errors.

use std::collections::BTreeMap;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;

use super::error::{ApiError, ResultExt};
use crate::AppState;
use crate::password;

const MAX_USERNAME_LENGTH: usize = 150;
const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    username: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

/// Field-keyed validation errors, one list of messages per failing field.
type FieldErrors = BTreeMap<&'static str, Vec<String>>;

fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("This field may not be blank.".into());
    }
    if username.len() > MAX_USERNAME_LENGTH {
        return Err(format!(
            "Ensure this field has no more than {} characters.",
            MAX_USERNAME_LENGTH
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "@.+-_".contains(c))
    {
        return Err(
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
                .into(),
        );
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("This field may not be blank.".into());
    }
    let valid = email
        .split_once('@')
        .map(|(local, domain)| {
            !local.is_empty()
                && !domain.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(|c| c.is_whitespace())
        })
        .unwrap_or(false);
    if !valid {
        return Err("Enter a valid email address.".into());
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("This field may not be blank.".into());
    }
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Ensure this field has at least {} characters.",
            MIN_PASSWORD_LENGTH
        ));
    }
    Ok(())
}

/// Register a new user. Returns 201 on success, or 400 with errors keyed by
/// field. Uniqueness is only checked for fields that pass shape validation.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = payload.username.trim();
    let email = payload.email.trim();

    let mut errors = FieldErrors::new();

    match validate_username(username) {
        Ok(()) => {
            let taken = state
                .db
                .users()
                .username_taken(username)
                .await
                .db_err("Failed to check username")?;
            if taken {
                errors.insert(
                    "username",
                    vec!["A user with that username already exists.".into()],
                );
            }
        }
        Err(msg) => {
            errors.insert("username", vec![msg]);
        }
    }

    match validate_email(email) {
        Ok(()) => {
            let taken = state
                .db
                .users()
                .email_taken(email)
                .await
                .db_err("Failed to check email")?;
            if taken {
                errors.insert("email", vec!["A user with that email already exists.".into()]);
            }
        }
        Err(msg) => {
            errors.insert("email", vec![msg]);
        }
    }

    if let Err(msg) = validate_password(&payload.password) {
        errors.insert("password", vec![msg]);
    }

    if !errors.is_empty() {
        return Ok((StatusCode::BAD_REQUEST, Json(serde_json::json!(errors))));
    }

    let password_hash = password::hash(&payload.password).map_err(|e| {
        tracing::error!(error = %e, "Failed to hash password");
        ApiError::internal("Failed to register user")
    })?;

    let uuid = uuid::Uuid::new_v4().to_string();
    state
        .db
        .users()
        .create(&uuid, username, email, &password_hash)
        .await
        .db_err("Failed to create user")?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "User registered successfully!",
            "success": true,
        })),
    ))
}
